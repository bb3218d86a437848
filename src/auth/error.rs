use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Missing credential '{0}': set the environment variable or add it to the credentials file")]
    Missing(&'static str),

    #[error("Failed to read credentials file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse credentials file '{0}'")]
    FileParse(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Token request to {url} was rejected with status {status}: {body}")]
    Rejected {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode token response from {0}")]
    Decode(String, #[source] reqwest::Error),
}
