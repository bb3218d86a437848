use crate::api::error::ApiError;
use crate::auth::error::{AuthError, CredentialsError};
use crate::export::error::OutputError;
use crate::types::area::TimeRangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetatmoExportError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
