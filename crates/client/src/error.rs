//! Client error types.

use pagedquery_core::query::FetchError;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while fetching a page over HTTP.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) if e.is_decode() => FetchError::InvalidResponse(e.to_string()),
            ClientError::Request(e) => FetchError::Request(e.to_string()),
            ClientError::ServerError { status, message } => FetchError::Server { status, message },
            ClientError::Json(e) => FetchError::InvalidResponse(e.to_string()),
        }
    }
}
