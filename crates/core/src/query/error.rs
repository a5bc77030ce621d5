use thiserror::Error;

/// Errors a fetcher can report for a page request.
///
/// Cloneable so a single failed request can be delivered to every caller
/// awaiting it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Fetch failed: {0}")]
    Other(String),
}

impl FetchError {
    /// Message safe to show to end users.
    ///
    /// Hides transport and payload details.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Server { status, .. } if *status == 401 || *status == 403 => {
                "You do not have permission to view this data".to_string()
            }
            FetchError::Server { status, .. } if *status >= 500 => {
                "Service temporarily unavailable, please try again".to_string()
            }
            _ => "Failed to load data".to_string(),
        }
    }
}

/// Result type returned by fetchers.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
