//! Error types for cache operations.

use std::fmt;

/// Errors that can occur during cache operations.
///
/// A miss is not an error: absent and expired entries are reported as
/// "no value" by lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// No memory available to copy the caller's value.
    /// The cache is unchanged; the caller proceeds without caching.
    OutOfMemory,

    /// The value is longer than a 32-bit length can describe.
    ValueTooLong,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::ValueTooLong => write!(f, "value too long (max 4GB)"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
