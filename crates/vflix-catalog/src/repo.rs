//! Video repository trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use vflix_models::{Video, VideoId};

use crate::error::{CatalogError, CatalogResult};

/// Access to catalog video records.
///
/// `insert` and `remove` model the catalog's own create/delete operations and
/// exist so the pipeline can be exercised end to end; the orchestrator itself
/// only calls `get` and `commit_manifests`.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a video by id; [`CatalogError::VideoNotFound`] for stale ids.
    async fn get(&self, id: VideoId) -> CatalogResult<Video>;

    /// Store a new video record.
    async fn insert(&self, video: Video) -> CatalogResult<()>;

    /// Persist the record with its manifest fields in one write.
    ///
    /// The whole record replaces the stored one atomically, so readers
    /// observe either no manifests or the complete ladder — never a partial
    /// one.
    async fn commit_manifests(&self, video: &Video) -> CatalogResult<()>;

    /// Delete a record, returning the removed snapshot (the deletion hooks
    /// need its title and attachment paths).
    async fn remove(&self, id: VideoId) -> CatalogResult<Video>;
}

/// In-memory repository for tests and single-process runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryVideoRepository {
    inner: Arc<Mutex<HashMap<VideoId, Video>>>,
}

impl MemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<VideoId, Video>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl VideoRepository for MemoryVideoRepository {
    async fn get(&self, id: VideoId) -> CatalogResult<Video> {
        self.lock()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::VideoNotFound(id))
    }

    async fn insert(&self, video: Video) -> CatalogResult<()> {
        self.lock().insert(video.id, video);
        Ok(())
    }

    async fn commit_manifests(&self, video: &Video) -> CatalogResult<()> {
        let mut map = self.lock();
        if !map.contains_key(&video.id) {
            return Err(CatalogError::VideoNotFound(video.id));
        }
        map.insert(video.id, video.clone());
        Ok(())
    }

    async fn remove(&self, id: VideoId) -> CatalogResult<Video> {
        self.lock()
            .remove(&id)
            .ok_or(CatalogError::VideoNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vflix_models::Resolution;

    fn sample() -> Video {
        Video::new(VideoId(1), "Test Video", "videos/Test_Video/video.mp4")
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = MemoryVideoRepository::new();
        let err = repo.get(VideoId(99)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let repo = MemoryVideoRepository::new();
        repo.insert(sample()).await.unwrap();

        let video = repo.get(VideoId(1)).await.unwrap();
        assert_eq!(video.title, "Test Video");
        assert!(!video.is_fully_transcoded());
    }

    #[tokio::test]
    async fn test_commit_manifests_replaces_record() {
        let repo = MemoryVideoRepository::new();
        repo.insert(sample()).await.unwrap();

        let mut video = repo.get(VideoId(1)).await.unwrap();
        for resolution in Resolution::ALL {
            video.set_manifest(resolution, format!("m_{}.m3u8", resolution.suffix()));
        }
        repo.commit_manifests(&video).await.unwrap();

        let stored = repo.get(VideoId(1)).await.unwrap();
        assert!(stored.is_fully_transcoded());
    }

    #[tokio::test]
    async fn test_commit_for_deleted_video_is_not_found() {
        let repo = MemoryVideoRepository::new();
        repo.insert(sample()).await.unwrap();
        repo.remove(VideoId(1)).await.unwrap();

        let video = sample();
        let err = repo.commit_manifests(&video).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_returns_snapshot() {
        let repo = MemoryVideoRepository::new();
        repo.insert(sample().with_thumbnail("thumbnails/Test_Video/t.jpg"))
            .await
            .unwrap();

        let removed = repo.remove(VideoId(1)).await.unwrap();
        assert_eq!(
            removed.thumbnail.as_deref(),
            Some("thumbnails/Test_Video/t.jpg")
        );
        assert!(repo.get(VideoId(1)).await.is_err());
    }
}
