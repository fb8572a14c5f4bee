//! Job types for the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vflix_models::{JobId, VideoId};

/// Job to transcode one catalog video into its HLS renditions.
///
/// The payload carries the video identity only; everything else is
/// re-fetched from the catalog at execution time so a redelivered job never
/// works from stale data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeVideoJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Catalog video to transcode
    pub video_id: VideoId,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl TranscodeVideoJob {
    /// Create a new transcode job for a video.
    pub fn new(video_id: VideoId) -> Self {
        Self {
            job_id: JobId::new(),
            video_id,
            created_at: Utc::now(),
        }
    }

    /// Generate idempotency key for deduplication.
    ///
    /// One key per video: creation enqueues exactly once, and an accidental
    /// second enqueue within the dedup window is rejected.
    pub fn idempotency_key(&self) -> String {
        format!("transcode:{}", self.video_id)
    }
}

/// Generic job wrapper for queue storage.
///
/// Tagged so the wire format stays extensible; today transcoding is the only
/// background job this system runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueJob {
    /// Derive all HLS renditions for one video
    TranscodeVideo(TranscodeVideoJob),
}

impl QueueJob {
    pub fn job_id(&self) -> &JobId {
        match self {
            QueueJob::TranscodeVideo(j) => &j.job_id,
        }
    }

    pub fn video_id(&self) -> VideoId {
        match self {
            QueueJob::TranscodeVideo(j) => j.video_id,
        }
    }

    pub fn idempotency_key(&self) -> String {
        match self {
            QueueJob::TranscodeVideo(j) => j.idempotency_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_job_serde_roundtrip() {
        let job = TranscodeVideoJob::new(VideoId(42));

        let wrapper = QueueJob::TranscodeVideo(job.clone());
        let json = serde_json::to_string(&wrapper).expect("serialize QueueJob");
        assert!(json.contains("\"type\":\"transcode_video\""));

        let decoded: QueueJob = serde_json::from_str(&json).expect("deserialize QueueJob");
        match decoded {
            QueueJob::TranscodeVideo(j) => {
                assert_eq!(j.job_id, job.job_id);
                assert_eq!(j.video_id, job.video_id);
                assert_eq!(j.created_at, job.created_at);
            }
        }
    }

    #[test]
    fn idempotency_key_is_per_video() {
        let a = TranscodeVideoJob::new(VideoId(1));
        let b = TranscodeVideoJob::new(VideoId(1));
        let c = TranscodeVideoJob::new(VideoId(2));

        // Two jobs for the same video share a key even though job ids differ.
        assert_eq!(a.idempotency_key(), b.idempotency_key());
        assert_ne!(a.idempotency_key(), c.idempotency_key());
        assert_eq!(a.idempotency_key(), "transcode:1");
    }
}
