use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PakaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Package manager error: {0}")]
    PackageManagerError(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Operation aborted by plugin: {0}")]
    AbortedByPlugin(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Lock acquisition failed (stale or contended ledger lock)
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// Path resolution or validation error
    #[error("Path error: {0}")]
    PathError(String),
}

pub type Result<T> = std::result::Result<T, PakaError>;
