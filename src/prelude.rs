pub use crate::ds::{NodeId, RingArena};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::clock_pro::{ClockProCache, ConcurrentClockProCache};
pub use crate::traits::{CoreCache, ReadOnlyCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::ClockProMetricsSnapshot;
