use api_client::error::ApiError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Image source error: {0}")]
    Source(#[from] ApiError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Failed to access manifest '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest '{path}': {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
