use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dog CEO returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("The API request returned an error: {0}")]
    Api(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// Transient failures worth another attempt: transport errors, rate
    /// limiting and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}
