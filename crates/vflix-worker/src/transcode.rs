//! Transcode orchestration for one video.
//!
//! One run drives sanitize → encode → package across all four resolutions,
//! strictly in sequence, then commits every manifest path in a single
//! catalog write. Any failure aborts the rest of the ladder and persists
//! nothing, so readers never see a video with only some resolutions
//! playable. Files already written by the failed attempt stay on disk until
//! a later run overwrites them; there is no automatic orphan sweep.

use std::sync::Arc;

use tokio::fs;

use vflix_catalog::VideoRepository;
use vflix_media::{fs_utils, TranscodePipeline};
use vflix_models::{Resolution, StorageLayout};
use vflix_queue::TranscodeVideoJob;

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;

/// Everything one orchestrator run needs, injected at construction.
pub struct TranscodeContext {
    pub repo: Arc<dyn VideoRepository>,
    pub pipeline: Arc<dyn TranscodePipeline>,
    pub layout: StorageLayout,
}

impl TranscodeContext {
    pub fn new(
        repo: Arc<dyn VideoRepository>,
        pipeline: Arc<dyn TranscodePipeline>,
        layout: StorageLayout,
    ) -> Self {
        Self {
            repo,
            pipeline,
            layout,
        }
    }
}

/// Derive every HLS rendition for the job's video.
///
/// Redelivery of a failed or timed-out job re-enters here and re-runs the
/// whole ladder from scratch; directory creation is idempotent and the
/// encoder overwrites earlier output, so a rerun is safe.
pub async fn run_transcode(ctx: &TranscodeContext, job: &TranscodeVideoJob) -> WorkerResult<()> {
    let logger = JobLogger::new(&job.job_id, "transcode_video");
    logger.log_start(&format!("video {}", job.video_id));

    // Fetch fresh at execution time. A video deleted between enqueue and
    // execution surfaces as VideoNotFound, which drops the job.
    let mut video = ctx.repo.get(job.video_id).await?;

    let stem = video
        .source_stem()
        .map(str::to_owned)
        .ok_or_else(|| {
            WorkerError::job_failed(format!(
                "source file {:?} has no usable file name",
                video.source_file
            ))
        })?;
    let source = ctx.layout.absolute(&video.source_file);

    let hls_dir = ctx.layout.hls_dir(&video.title);
    fs::create_dir_all(&hls_dir).await?;

    for resolution in Resolution::ALL {
        logger.log_progress(&format!("encoding {} rendition", resolution));

        let rendition = ctx.layout.rendition_path(&video.title, &stem, resolution);
        ctx.pipeline
            .transcode(&source, &rendition, resolution)
            .await?;

        let prefix = ctx.layout.hls_prefix(&video.title, &stem, resolution);
        let manifest = ctx.pipeline.package(&rendition, &prefix).await?;

        let relative = ctx.layout.relative_to_root(&manifest).map_err(|_| {
            WorkerError::job_failed(format!(
                "manifest {} is outside the media root",
                manifest.display()
            ))
        })?;
        video.set_manifest(resolution, relative);

        // The intermediate rendition never outlives the run.
        fs_utils::remove_file_if_exists(&rendition).await?;
    }

    // One write covering all four fields.
    ctx.repo.commit_manifests(&video).await?;

    logger.log_completion(&format!("video {} fully transcoded", job.video_id));
    Ok(())
}
