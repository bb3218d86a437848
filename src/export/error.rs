use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode CSV for '{0}'")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("Failed to encode JSON for '{0}'")]
    JsonEncode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to read '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse JSON export")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid record {index} for station '{station}': {message}")]
    InvalidRecord {
        station: String,
        index: usize,
        message: String,
    },
}
