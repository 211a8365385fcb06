//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal bookkeeping disagrees with
//!   itself (`check_invariants` methods).
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (out-of-range tier ratios, missing reference trace, unknown policy name).
//! - [`ParseError`]: Returned when a simulation workload cannot be parsed.
//!
//! Cache misses are never errors, and degenerate capacities are clamped rather
//! than rejected.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::ConfigError;
//! use evictkit::policy::two_q::TwoQueueCache;
//!
//! let cache: Result<TwoQueueCache<u64, u64>, ConfigError> =
//!     TwoQueueCache::try_with_ratios(100, 0.25, 0.5);
//! assert!(cache.is_ok());
//!
//! // Tier fractions that leave no room for the main store are rejected.
//! let bad = TwoQueueCache::<u64, u64>::try_with_ratios(100, 0.5, 0.6);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` on cache types (e.g.
/// [`TwoQueueCache::check_invariants`](crate::policy::two_q::TwoQueueCache::check_invariants)).
/// Carries a human-readable description of which invariant failed.
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

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`TwoQueueCache::try_with_ratios`](crate::policy::two_q::TwoQueueCache::try_with_ratios)
/// and by [`CacheBuilder::build`](crate::builder::CacheBuilder::build).
///
/// # Example
///
/// ```
/// use evictkit::builder::{CacheBuilder, CachePolicy};
///
/// let err = CacheBuilder::new(4)
///     .build::<u64, u64>(CachePolicy::Ideal)
///     .unwrap_err();
/// assert!(err.to_string().contains("trace"));
/// ```
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

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Error returned when a workload description is malformed.
///
/// Records the zero-based token index at which parsing stopped, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    msg: String,
    token: Option<usize>,
}

impl ParseError {
    /// Creates a `ParseError` that is not tied to a specific token.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            token: None,
        }
    }

    /// Creates a `ParseError` pointing at the token with index `token`.
    #[inline]
    pub fn at_token(token: usize, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            token: Some(token),
        }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the offending token index, if any.
    #[inline]
    pub fn token(&self) -> Option<usize> {
        self.token
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Some(token) => write!(f, "token {token}: {}", self.msg),
            None => f.write_str(&self.msg),
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
