use std::path::PathBuf;
use thiserror::Error;

/// The ledger file (or its directory or lock) could not be read or written.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create ledger directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read ledger {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write ledger {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Corrupt ledger {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to acquire lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Timed out after {waited_ms}ms waiting for lock {}", .path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },
}

/// Malformed input, rejected before any file is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("service must not be empty")]
    EmptyService,
    #[error("operation must not be empty")]
    EmptyOperation,
    #[error("cost must not be negative (got {0})")]
    NegativeCost(f64),
    #[error("cost must be a finite number (got {0})")]
    NonFiniteCost(f64),
    #[error("daily total would not be a finite number (got {0})")]
    NonFiniteTotal(f64),
    #[error("days must be at least 1")]
    ZeroDays,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    pub fn is_storage(&self) -> bool {
        matches!(self, LedgerError::Storage(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}
