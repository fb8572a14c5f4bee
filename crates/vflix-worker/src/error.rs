//! Worker error types.

use thiserror::Error;

use vflix_catalog::CatalogError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] vflix_media::MediaError),

    #[error("Queue error: {0}")]
    Queue(#[from] vflix_queue::QueueError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// A permanent failure: the entity the job refers to is gone, so the
    /// job is dropped instead of retried.
    pub fn is_permanent(&self) -> bool {
        matches!(self, WorkerError::Catalog(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vflix_models::VideoId;

    #[test]
    fn test_not_found_is_permanent() {
        let err = WorkerError::from(CatalogError::VideoNotFound(VideoId(1)));
        assert!(err.is_permanent());
    }

    #[test]
    fn test_encode_failure_is_retryable() {
        let err = WorkerError::from(vflix_media::MediaError::encode_failed(
            "boom",
            None,
            Some(1),
        ));
        assert!(!err.is_permanent());
    }
}
