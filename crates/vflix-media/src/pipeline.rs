//! The two-stage pipeline seam the orchestrator drives.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use vflix_models::Resolution;

use crate::command::{check_ffmpeg, FfmpegRunner};
use crate::error::MediaResult;
use crate::hls::package_hls;
use crate::transcode::transcode_to_resolution;

/// Produces renditions and packages them as HLS.
///
/// The orchestrator only talks to this trait, which keeps it testable
/// without an encoder on PATH.
#[async_trait]
pub trait TranscodePipeline: Send + Sync {
    /// Encode `source` into a fixed-resolution rendition at `dest`.
    async fn transcode(&self, source: &Path, dest: &Path, resolution: Resolution)
        -> MediaResult<()>;

    /// Package a rendition into `<prefix>.m3u8` + `<prefix>_NNN.ts` segments;
    /// returns the manifest path.
    async fn package(&self, rendition: &Path, output_prefix: &Path) -> MediaResult<PathBuf>;
}

/// Production pipeline backed by the `ffmpeg` binary.
pub struct FfmpegPipeline {
    runner: FfmpegRunner,
}

impl FfmpegPipeline {
    /// Create a pipeline, verifying up front that `ffmpeg` is on PATH so a
    /// misconfigured worker fails at startup instead of on its first job.
    pub fn new() -> MediaResult<Self> {
        Self::with_runner(FfmpegRunner::new())
    }

    /// Create a pipeline around a configured runner (deadline, cancellation).
    pub fn with_runner(runner: FfmpegRunner) -> MediaResult<Self> {
        check_ffmpeg()?;
        Ok(Self { runner })
    }
}

#[async_trait]
impl TranscodePipeline for FfmpegPipeline {
    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        resolution: Resolution,
    ) -> MediaResult<()> {
        transcode_to_resolution(&self.runner, source, dest, resolution).await
    }

    async fn package(&self, rendition: &Path, output_prefix: &Path) -> MediaResult<PathBuf> {
        package_hls(&self.runner, rendition, output_prefix).await
    }
}
