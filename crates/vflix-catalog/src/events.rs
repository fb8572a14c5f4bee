//! Catalog lifecycle events and their hooks.
//!
//! The catalog publishes an explicit event when a video is created or
//! deleted; the hooks turn those into work. Creation enqueues exactly one
//! transcode job — updates never re-publish `VideoCreated`, so re-saving a
//! record cannot re-trigger transcoding. Deletion synchronously removes the
//! derived directory trees.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use vflix_media::fs_utils;
use vflix_models::{StorageLayout, Video, VideoId};
use vflix_queue::{JobQueue, QueueResult, TranscodeVideoJob};

use crate::error::CatalogResult;

/// A lifecycle event published by the catalog's create/delete operations.
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// A new video record was created; its source file is uploaded.
    VideoCreated { id: VideoId },
    /// A record was deleted; the snapshot carries the paths to clean up.
    VideoDeleted { video: Video },
}

/// Hands transcode work to the background queue.
///
/// A trait so the hooks take an injected client rather than reaching for
/// ambient state, and so tests can observe dispatches without Redis.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Fire-and-forget enqueue; returns the queue's message id.
    async fn dispatch_transcode(&self, video_id: VideoId) -> QueueResult<String>;
}

#[async_trait]
impl JobDispatcher for JobQueue {
    async fn dispatch_transcode(&self, video_id: VideoId) -> QueueResult<String> {
        self.enqueue_transcode(TranscodeVideoJob::new(video_id))
            .await
    }
}

/// Bridges catalog events to the queue and the filesystem.
pub struct LifecycleHooks {
    dispatcher: Arc<dyn JobDispatcher>,
    layout: StorageLayout,
}

impl LifecycleHooks {
    pub fn new(dispatcher: Arc<dyn JobDispatcher>, layout: StorageLayout) -> Self {
        Self { dispatcher, layout }
    }

    /// Handle one catalog event.
    pub async fn handle(&self, event: CatalogEvent) -> CatalogResult<()> {
        match event {
            CatalogEvent::VideoCreated { id } => {
                let message_id = self.dispatcher.dispatch_transcode(id).await?;
                info!("Enqueued transcode for video {} ({})", id, message_id);
                Ok(())
            }
            CatalogEvent::VideoDeleted { video } => self.on_deleted(&video).await,
        }
    }

    /// Remove everything ever derived for the record.
    ///
    /// The two deletions are independent: the video tree only if a source
    /// file was attached, the thumbnail's containing directory only if a
    /// thumbnail was. Missing directories are fine (an upload may have
    /// failed before any transcode ran); permission failures propagate.
    async fn on_deleted(&self, video: &Video) -> CatalogResult<()> {
        if !video.source_file.is_empty() {
            let video_dir = self.layout.video_dir(&video.title);
            fs_utils::remove_tree_if_exists(&video_dir).await?;
            info!("Removed video tree {}", video_dir.display());
        }

        if let Some(thumbnail) = &video.thumbnail {
            let thumbnail_dir = match Path::new(thumbnail).parent() {
                Some(parent) if parent != Path::new("") => self.layout.absolute(parent),
                _ => self.layout.thumbnail_dir(&video.title),
            };
            fs_utils::remove_tree_if_exists(&thumbnail_dir).await?;
            info!("Removed thumbnail dir {}", thumbnail_dir.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::fs;

    #[derive(Default)]
    struct RecordingDispatcher {
        dispatched: Mutex<Vec<VideoId>>,
    }

    #[async_trait]
    impl JobDispatcher for RecordingDispatcher {
        async fn dispatch_transcode(&self, video_id: VideoId) -> QueueResult<String> {
            let mut dispatched = self.dispatched.lock().unwrap();
            dispatched.push(video_id);
            Ok(format!("msg-{}", dispatched.len()))
        }
    }

    fn hooks_with(dir: &TempDir) -> (Arc<RecordingDispatcher>, LifecycleHooks) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let hooks = LifecycleHooks::new(
            Arc::clone(&dispatcher) as Arc<dyn JobDispatcher>,
            StorageLayout::new(dir.path()),
        );
        (dispatcher, hooks)
    }

    #[tokio::test]
    async fn test_creation_dispatches_exactly_one_job() {
        let dir = TempDir::new().unwrap();
        let (dispatcher, hooks) = hooks_with(&dir);

        hooks
            .handle(CatalogEvent::VideoCreated { id: VideoId(7) })
            .await
            .unwrap();

        assert_eq!(*dispatcher.dispatched.lock().unwrap(), vec![VideoId(7)]);
    }

    #[tokio::test]
    async fn test_deletion_removes_video_tree_and_thumbnail_dir() {
        let dir = TempDir::new().unwrap();
        let (_, hooks) = hooks_with(&dir);

        let video_dir = dir.path().join("videos/Test_Video");
        fs::create_dir_all(video_dir.join("HLS_files")).await.unwrap();
        fs::write(video_dir.join("video.mp4"), b"src").await.unwrap();
        let thumb_dir = dir.path().join("thumbnails/Test_Video");
        fs::create_dir_all(&thumb_dir).await.unwrap();
        fs::write(thumb_dir.join("t.jpg"), b"img").await.unwrap();

        let video = Video::new(VideoId(1), "Test Video", "videos/Test_Video/video.mp4")
            .with_thumbnail("thumbnails/Test_Video/t.jpg");

        hooks
            .handle(CatalogEvent::VideoDeleted { video })
            .await
            .unwrap();

        assert!(!video_dir.exists());
        assert!(!thumb_dir.exists());
    }

    #[tokio::test]
    async fn test_deletion_with_no_directories_is_not_an_error() {
        // Source upload failed before any transcode ran: nothing on disk.
        let dir = TempDir::new().unwrap();
        let (_, hooks) = hooks_with(&dir);

        let video = Video::new(VideoId(2), "Never Transcoded", "videos/Never_Transcoded/v.mp4");
        hooks
            .handle(CatalogEvent::VideoDeleted { video })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deletion_without_source_leaves_video_tree_alone() {
        let dir = TempDir::new().unwrap();
        let (_, hooks) = hooks_with(&dir);

        // A colliding record without an attached source must not take the
        // directory down with it.
        let video_dir = dir.path().join("videos/Shared_Title");
        fs::create_dir_all(&video_dir).await.unwrap();

        let video = Video::new(VideoId(3), "Shared Title", "");
        hooks
            .handle(CatalogEvent::VideoDeleted { video })
            .await
            .unwrap();

        assert!(video_dir.exists());
    }
}
