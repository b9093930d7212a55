//! Error types for the code-intelligence index engine.
//!
//! `IndexError` is the rich, internal error enum raised by every subsystem.
//! `ErrorCode` is the stable wire-identity subset spec.md §6 requires — its
//! string names and retryability never change even as `IndexError` grows new
//! variants, so callers that match on codes are insulated from internal
//! refactors.

use crate::types::{FileId, SymbolId};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for indexing and query operations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File '{path}' is {size} bytes, exceeding the {limit} byte limit")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid object id: {reason}")]
    InvalidObjectId { reason: String },

    #[error("Symbol '{name}' not found")]
    SymbolNotFound { name: String },

    #[error("File id {id:?} not found in the content store")]
    FileNotFound { id: FileId },

    #[error("Symbol id {id:?} not found in the reference tracker")]
    SymbolIdNotFound { id: SymbolId },

    #[error("Failed to allocate a file id: the 32-bit space is exhausted")]
    FileIdExhausted,

    #[error("Failed to allocate a symbol id: the 64-bit space is exhausted")]
    SymbolIdExhausted,

    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("Lock acquisition for {index_type} timed out after {waited:?}")]
    LockTimeout { index_type: String, waited: Duration },

    #[error("Lock for {index_type} unavailable: {reason}")]
    LockUnavailable { index_type: String, reason: String },

    #[error("Missing required subcomponent: {component}")]
    MissingComponent { component: &'static str },

    #[error("failed to get {section}: {cause}")]
    ContextSection { section: &'static str, cause: String },

    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Recovery suggestions, mirrored from the teacher's actionable-error
    /// convention (`error.rs::recovery_suggestions`).
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::LockTimeout { .. } => vec![
                "Retry the operation; lock timeouts are transient",
                "Reduce concurrent writers if timeouts persist",
            ],
            Self::LockUnavailable { .. } => {
                vec!["Retry after the reported wait, or lower contention"]
            }
            Self::FileTooLarge { .. } => {
                vec!["Raise the file size limit in configuration if this file is expected"]
            }
            Self::MissingComponent { .. } => {
                vec!["Construct the engine with all required subcomponents before querying"]
            }
            _ => vec![],
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Helper trait for adding context to foreign errors, mirroring the
/// teacher's `ErrorContext` convention.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T, IndexError>;
    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("{}: {}", msg, e)))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError> {
        self.map_err(|e| {
            IndexError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}

/// Stable error-code strings per spec.md §6. These are the wire identity
/// clients match on; never rename a variant once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    LockTimeout,
    LockUnavailable,
    DeadlockDetected,
    ContentionTooHigh,
    InvalidIndexType,
    IndexUnavailable,
    IndexCorrupted,
    ConcurrentLimit,
    ResourceExhausted,
    MemoryLimit,
    SystemShutdown,
    ConfigurationError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockTimeout => "LOCK_TIMEOUT",
            Self::LockUnavailable => "LOCK_UNAVAILABLE",
            Self::DeadlockDetected => "DEADLOCK_DETECTED",
            Self::ContentionTooHigh => "CONTENTION_TOO_HIGH",
            Self::InvalidIndexType => "INVALID_INDEX_TYPE",
            Self::IndexUnavailable => "INDEX_UNAVAILABLE",
            Self::IndexCorrupted => "INDEX_CORRUPTED",
            Self::ConcurrentLimit => "CONCURRENT_LIMIT",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::MemoryLimit => "MEMORY_LIMIT",
            Self::SystemShutdown => "SYSTEM_SHUTDOWN",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }

    /// Per spec.md §6: lock/contention/resource pressure is retryable;
    /// everything else (corruption, shutdown, config) is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout
                | Self::LockUnavailable
                | Self::ContentionTooHigh
                | Self::ConcurrentLimit
                | Self::ResourceExhausted
                | Self::IndexUnavailable
        )
    }

    /// Suggested delay before a retry attempt, per spec.md §6: exponential
    /// backoff for lock issues, linear for contention, a fixed scale for
    /// other retryable codes.
    pub fn retry_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.is_retryable() {
            return None;
        }
        let delay = match self {
            Self::LockTimeout | Self::LockUnavailable => {
                Duration::from_millis(100) * 2u32.saturating_pow(attempt)
            }
            Self::ContentionTooHigh => Duration::from_secs(1) * attempt.max(1),
            _ => Duration::from_millis(500) * attempt.max(1),
        };
        Some(delay)
    }
}
