//! Error types for the metric database.
//!
//! This module provides a unified error type for all MDB operations.
//! Error codes follow the pattern `MDB-XXX` for easy debugging.

use thiserror::Error;

/// Result type alias for MDB operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in MDB operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation failure (MDB-001).
    #[error("[MDB-001] out of memory")]
    OutOfMemory,

    /// Malformed caller input (MDB-002).
    #[error("[MDB-002] invalid argument: {0}")]
    InvalidArgument(String),

    /// Lookup found nothing; never fatal (MDB-003).
    #[error("[MDB-003] not found: {0}")]
    NotFound(String),

    /// Operation declared but not implemented in this revision (MDB-004).
    #[error("[MDB-004] unsupported: {0}")]
    Unsupported(String),

    /// An internal invariant was violated (MDB-005).
    ///
    /// Indicates data-structure corruption; callers should treat this as
    /// fatal rather than retry.
    #[error("[MDB-005] internal corruption: {0}")]
    InternalCorruption(String),

    /// A match-expression operand failed to compile as a regex (MDB-006).
    #[error("[MDB-006] invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error (MDB-007).
    #[error("[MDB-007] configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the stable error code (e.g., "MDB-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "MDB-001",
            Self::InvalidArgument(_) => "MDB-002",
            Self::NotFound(_) => "MDB-003",
            Self::Unsupported(_) => "MDB-004",
            Self::InternalCorruption(_) => "MDB-005",
            Self::Regex(_) => "MDB-006",
            Self::Config(_) => "MDB-007",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// Corruption is not: the subsystem that raised it may be left in an
    /// inconsistent state.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InternalCorruption(_))
    }
}
