use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No save file found at {}", .0.display())]
    SaveNotFound(PathBuf),

    #[error("Incompatible save file version '{found}' (expected '{expected}')")]
    IncompatibleSaveVersion { found: String, expected: String },

    #[error("Corrupt save file: {0}")]
    CorruptSave(String),

    #[error("Invalid world size {width}x{height} (each side must be 1-100)")]
    InvalidWorldSize { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, WorldError>;
