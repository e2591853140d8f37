//! Error types for symlink-walker
//!
//! This module defines the error hierarchy that covers:
//! - Fatal startup errors (missing search root, unreachable target)
//! - Per-entry filesystem errors raised while scanning a directory
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Per-entry errors never abort a search. They are reported, counted and
//! the worker moves on to the next entry.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for symlink-walker
#[derive(Error, Debug)]
pub enum SearchError {
    /// The search root has no directory entry
    #[error("\"{}\" does not exist", .0.display())]
    RootNotFound(PathBuf),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// I/O errors (output stream, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Match output channel closed unexpectedly
    #[error("Match output channel closed unexpectedly")]
    OutputClosed,
}

/// Filesystem errors scoped to a single entry
#[derive(Error, Debug)]
pub enum ScanError {
    /// Directory could not be opened for listing
    #[error("Failed to read directory '{}': {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    /// A listing entry could not be read
    #[error("Failed to read entry in '{}': {source}", dir.display())]
    ReadEntry { dir: PathBuf, source: io::Error },

    /// Entry type could not be determined
    #[error("Failed to inspect '{}': {source}", path.display())]
    Inspect { path: PathBuf, source: io::Error },

    /// Symlink value could not be read
    #[error("Failed to read link '{}': {source}", path.display())]
    ReadLink { path: PathBuf, source: io::Error },
}

impl ScanError {
    /// Path the error is attached to
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::ReadDir { path, .. } => path,
            ScanError::ReadEntry { dir, .. } => dir,
            ScanError::Inspect { path, .. } => path,
            ScanError::ReadLink { path, .. } => path,
        }
    }

    fn source_kind(&self) -> io::ErrorKind {
        match self {
            ScanError::ReadDir { source, .. }
            | ScanError::ReadEntry { source, .. }
            | ScanError::Inspect { source, .. }
            | ScanError::ReadLink { source, .. } => source.kind(),
        }
    }

    /// Check if this is an expected condition of a live tree
    /// (entry vanished or access denied) rather than an I/O fault
    pub fn is_expected(&self) -> bool {
        matches!(
            self.source_kind(),
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
        )
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Target path cannot be resolved
    #[error("Target '{}' is unreachable", path.display())]
    TargetUnreachable { path: PathBuf, source: io::Error },

    /// Search directory cannot be made absolute
    #[error("Invalid search directory '{}'", path.display())]
    InvalidSearchDir { path: PathBuf, source: io::Error },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// No worker thread could be started
    #[error("No worker could be started")]
    NoWorkers,
}

/// Result type alias for SearchError
pub type Result<T> = std::result::Result<T, SearchError>;

/// Result type alias for ScanError
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Represents the outcome of processing a single scan task
#[derive(Debug)]
pub enum ScanOutcome {
    /// Directory listing completed (possibly cut short by a match)
    Scanned {
        path: PathBuf,
        entries: usize,
        subdirs: usize,
        matches: usize,
    },

    /// The task path itself was a link pointing at the target
    Matched { path: PathBuf },

    /// Nothing to scan (seed task is not a directory)
    Skipped { path: PathBuf, reason: String },

    /// Directory could not be listed
    Failed { path: PathBuf, error: ScanError },
}

impl ScanOutcome {
    /// Returns true unless the directory could not be listed
    pub fn is_success(&self) -> bool {
        !matches!(self, ScanOutcome::Failed { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanOutcome::Scanned { path, .. } => path,
            ScanOutcome::Matched { path } => path,
            ScanOutcome::Skipped { path, .. } => path,
            ScanOutcome::Failed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_expected() {
        let denied = ScanError::ReadDir {
            path: "/locked".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(denied.is_expected());
        assert_eq!(denied.path(), &PathBuf::from("/locked"));

        let fault = ScanError::ReadLink {
            path: "/bad".into(),
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert!(!fault.is_expected());
    }

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::InvalidWorkerCount { count: 0, max: 512 };
        let search_err: SearchError = config_err.into();
        assert!(matches!(search_err, SearchError::Config(_)));
    }

    #[test]
    fn test_root_not_found_message() {
        let err = SearchError::RootNotFound("/no/such/dir".into());
        assert_eq!(err.to_string(), "\"/no/such/dir\" does not exist");
    }

    #[test]
    fn test_outcome_success() {
        let failed = ScanOutcome::Failed {
            path: "/a".into(),
            error: ScanError::ReadDir {
                path: "/a".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        };
        assert!(!failed.is_success());
        assert_eq!(failed.path(), &PathBuf::from("/a"));

        let matched = ScanOutcome::Matched { path: "/b".into() };
        assert!(matched.is_success());
    }
}
