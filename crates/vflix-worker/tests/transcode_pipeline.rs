//! End-to-end orchestrator runs against a stub encoder.
//!
//! The stub writes placeholder renditions, manifests and segments instead of
//! spawning ffmpeg, so these tests exercise the full orchestration path —
//! directory layout, sequencing, cleanup, atomic persistence — on any
//! machine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::fs;

use vflix_catalog::{MemoryVideoRepository, VideoRepository};
use vflix_media::{MediaError, MediaResult, TranscodePipeline};
use vflix_models::{Resolution, StorageLayout, Video, VideoId};
use vflix_queue::TranscodeVideoJob;
use vflix_worker::{run_transcode, TranscodeContext};

/// Writes placeholder files instead of invoking an encoder. Optionally fails
/// the encode of one resolution to simulate a non-zero tool exit.
struct StubPipeline {
    fail_at: Option<Resolution>,
}

impl StubPipeline {
    fn ok() -> Self {
        Self { fail_at: None }
    }

    fn failing_at(resolution: Resolution) -> Self {
        Self {
            fail_at: Some(resolution),
        }
    }
}

#[async_trait]
impl TranscodePipeline for StubPipeline {
    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        resolution: Resolution,
    ) -> MediaResult<()> {
        if !source.exists() {
            return Err(MediaError::FileNotFound(source.to_path_buf()));
        }
        if self.fail_at == Some(resolution) {
            return Err(MediaError::encode_failed(
                format!("simulated encoder failure at {}", resolution),
                Some("Conversion failed!".to_string()),
                Some(1),
            ));
        }
        fs::write(dest, format!("rendition {}", resolution)).await?;
        Ok(())
    }

    async fn package(&self, rendition: &Path, output_prefix: &Path) -> MediaResult<PathBuf> {
        if !rendition.exists() {
            return Err(MediaError::FileNotFound(rendition.to_path_buf()));
        }

        let mut playlist = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:10\n");
        for n in 0..2 {
            let segment = PathBuf::from(format!("{}_{:03}.ts", output_prefix.display(), n));
            fs::write(&segment, b"segment").await?;
            let name = segment.file_name().unwrap().to_string_lossy().into_owned();
            playlist.push_str(&format!("#EXTINF:10.0,\n{}\n", name));
        }
        playlist.push_str("#EXT-X-ENDLIST\n");

        let manifest = PathBuf::from(format!("{}.m3u8", output_prefix.display()));
        fs::write(&manifest, playlist).await?;
        Ok(manifest)
    }
}

/// Insert the canonical test video and put its source file on disk.
async fn seed_video(media_root: &Path, repo: &MemoryVideoRepository) {
    let video = Video::new(VideoId(1), "Test Video", "videos/Test_Video/video.mp4");
    fs::create_dir_all(media_root.join("videos/Test_Video"))
        .await
        .unwrap();
    fs::write(media_root.join("videos/Test_Video/video.mp4"), b"source")
        .await
        .unwrap();
    repo.insert(video).await.unwrap();
}

fn context(
    media_root: &Path,
    repo: &MemoryVideoRepository,
    pipeline: StubPipeline,
) -> TranscodeContext {
    TranscodeContext::new(
        Arc::new(repo.clone()),
        Arc::new(pipeline),
        StorageLayout::new(media_root),
    )
}

#[tokio::test]
async fn full_run_populates_all_manifests() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();
    seed_video(dir.path(), &repo).await;

    let ctx = context(dir.path(), &repo, StubPipeline::ok());
    run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap();

    let stored = repo.get(VideoId(1)).await.unwrap();
    assert_eq!(
        stored.manifest(Resolution::R360),
        Some("videos/Test_Video/HLS_files/video_360p.m3u8")
    );
    assert!(stored.is_fully_transcoded());

    // Each persisted manifest is a readable file whose segments exist.
    for resolution in Resolution::ALL {
        let manifest_rel = stored.manifest(resolution).unwrap();
        let manifest = dir.path().join(manifest_rel);
        assert!(manifest.exists(), "missing manifest {}", manifest.display());

        let segment = dir.path().join(format!(
            "videos/Test_Video/HLS_files/video_{}_000.ts",
            resolution.suffix()
        ));
        assert!(segment.exists(), "missing segment {}", segment.display());
    }
}

#[tokio::test]
async fn intermediate_renditions_never_survive_a_run() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();
    seed_video(dir.path(), &repo).await;

    let ctx = context(dir.path(), &repo, StubPipeline::ok());
    run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap();

    for resolution in Resolution::ALL {
        let rendition = dir.path().join(format!(
            "videos/Test_Video/HLS_files/video_{}.mp4",
            resolution.suffix()
        ));
        assert!(
            !rendition.exists(),
            "intermediate left behind: {}",
            rendition.display()
        );
    }
}

#[tokio::test]
async fn failure_mid_ladder_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();
    seed_video(dir.path(), &repo).await;

    let ctx = context(dir.path(), &repo, StubPipeline::failing_at(Resolution::R720));
    let err = run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap_err();
    assert!(!err.is_permanent());

    // 360p and 480p completed on disk, but not one field became visible.
    let stored = repo.get(VideoId(1)).await.unwrap();
    for resolution in Resolution::ALL {
        assert!(stored.manifest(resolution).is_none());
    }

    // The completed resolutions' files remain as orphans awaiting a rerun.
    let orphan = dir
        .path()
        .join("videos/Test_Video/HLS_files/video_360p.m3u8");
    assert!(orphan.exists());
}

#[tokio::test]
async fn rerun_after_failure_completes_cleanly() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();
    seed_video(dir.path(), &repo).await;

    let failing = context(dir.path(), &repo, StubPipeline::failing_at(Resolution::R720));
    run_transcode(&failing, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap_err();

    // Redelivery: same directories, full ladder from scratch.
    let ctx = context(dir.path(), &repo, StubPipeline::ok());
    run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap();

    let stored = repo.get(VideoId(1)).await.unwrap();
    assert!(stored.is_fully_transcoded());

    for resolution in Resolution::ALL {
        let rendition = dir.path().join(format!(
            "videos/Test_Video/HLS_files/video_{}.mp4",
            resolution.suffix()
        ));
        assert!(!rendition.exists());
    }
}

#[tokio::test]
async fn missing_video_is_a_permanent_failure() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();

    let ctx = context(dir.path(), &repo, StubPipeline::ok());
    let err = run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(9)))
        .await
        .unwrap_err();

    // Deleted-after-enqueue: the job is dropped, never retried.
    assert!(err.is_permanent());
}

#[tokio::test]
async fn video_deleted_during_run_does_not_resurrect() {
    let dir = TempDir::new().unwrap();
    let repo = MemoryVideoRepository::new();
    seed_video(dir.path(), &repo).await;
    repo.remove(VideoId(1)).await.unwrap();

    let ctx = context(dir.path(), &repo, StubPipeline::ok());
    let err = run_transcode(&ctx, &TranscodeVideoJob::new(VideoId(1)))
        .await
        .unwrap_err();
    assert!(err.is_permanent());
}
