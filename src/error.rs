use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),

    #[error("Rotation error: {0}")]
    Rotation(#[from] RotationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced by the pure rotation core (date extraction and planning).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    #[error("No recognized date pattern in filename: {0:?}")]
    UnparseableFilename(String),

    #[error("Invalid input for file {file:?}: {reason}")]
    InvalidInput { file: String, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Daily directory not found under root: {0}")]
    DailyNotFound(PathBuf),

    #[error("Failed to create tier directory {path}: {source}")]
    DirectoryCreation { path: PathBuf, source: io::Error },

    #[error("Failed to read tier directory {path}: {source}")]
    DirectoryRead { path: PathBuf, source: io::Error },

    #[error("Failed to move {file:?} to {target}: {source}")]
    FileMove {
        file: String,
        target: PathBuf,
        source: io::Error,
    },

    #[error("Failed to delete {file:?}: {source}")]
    FileDelete { file: String, source: io::Error },

    #[error("Refusing to delete {0:?}: not in quarantine")]
    DeleteOutsideQuarantine(String),
}
