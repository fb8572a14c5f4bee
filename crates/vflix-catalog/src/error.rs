//! Catalog error types.

use thiserror::Error;

use vflix_models::VideoId;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The referenced video no longer exists — usually a job racing a
    /// deletion. The job is dropped, not retried.
    #[error("video {0} not found")]
    VideoNotFound(VideoId),

    #[error("Queue error: {0}")]
    Queue(#[from] vflix_queue::QueueError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::VideoNotFound(_))
    }
}
