//! Error types for Plegma.
//!
//! All fallible operations across the workspace return [`Result`]. Callers
//! are expected to branch on the error kind, so every failure condition maps
//! to exactly one variant and no operation panics on user input.

/// The unified error type for Plegma operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A named storage location does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A malformed request: out-of-range index, colliding or unknown column
    /// name, mismatched row count.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A structurally wrong call for the current state, such as writing back
    /// a graph that was never loaded from storage.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// A post-load or post-mutation invariant check failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An encode or decode failure, including corrupt or truncated frames.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error came from a missing file or storage
    /// location.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns true if this error reports a destination that already exists.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::AlreadyExists)
    }
}

/// Result alias used throughout Plegma.
pub type Result<T> = std::result::Result<T, Error>;
