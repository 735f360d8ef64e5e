use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    #[error("Failed to download image: {0}")]
    Fetch(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
