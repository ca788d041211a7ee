//! Error types for the clockpro library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (the only user-facing failure; a zero capacity cannot host a clock).
//! - [`InvariantError`]: Returned by [`check_invariants`] when the engine's
//!   internal bookkeeping is inconsistent. An `Err` here is a defect in the
//!   engine, never a runtime condition callers should handle.
//!
//! [`check_invariants`]: crate::policy::clock_pro::ClockProCache::check_invariants
//!
//! ## Example Usage
//!
//! ```
//! use clockpro::error::ConfigError;
//! use clockpro::policy::clock_pro::ClockProCache;
//!
//! let cache: Result<ClockProCache<String, i32>, ConfigError> = ClockProCache::try_new(64);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking.
//! let bad = ClockProCache::<String, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when construction parameters are invalid.
///
/// Produced by [`ClockProCache::try_new`](crate::policy::clock_pro::ClockProCache::try_new).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Error returned when internal engine invariants are violated.
///
/// Produced by
/// [`ClockProCache::check_invariants`](crate::policy::clock_pro::ClockProCache::check_invariants),
/// which sweeps the metadata ring and cross-checks it against the key index,
/// the three hands, and the population counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}
