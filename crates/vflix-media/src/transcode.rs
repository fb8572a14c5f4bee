//! Single-resolution rendition encoding.

use std::path::Path;

use vflix_models::encoding::{AUDIO_CODEC, TARGET_CRF, VIDEO_CODEC};
use vflix_models::Resolution;

use crate::command::{FfmpegCommand, FfmpegRunner, RunError};
use crate::error::{MediaError, MediaResult};
use crate::paths::to_mounted_path;

/// Re-encode `source` into a fixed-resolution rendition at `dest`.
///
/// Blocks (asynchronously) until the encoder exits. A non-zero exit is a
/// hard [`MediaError::EncodeFailed`]; there is no retry at this layer —
/// redelivery, if any, re-runs the whole video from scratch.
pub async fn transcode_to_resolution(
    runner: &FfmpegRunner,
    source: &Path,
    dest: &Path,
    resolution: Resolution,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(to_mounted_path(source), to_mounted_path(dest))
        .size(resolution.dimensions())
        .video_codec(VIDEO_CODEC)
        .crf(TARGET_CRF)
        .audio_codec(AUDIO_CODEC)
        // aac is still flagged experimental by some builds
        .output_args(["-strict", "-2"]);

    match runner.run(&cmd).await {
        Ok(()) => Ok(()),
        Err(RunError::Exited { exit_code, stderr }) => Err(MediaError::encode_failed(
            format!(
                "ffmpeg exited with non-zero status encoding {} to {}",
                source.display(),
                resolution
            ),
            stderr,
            exit_code,
        )),
        Err(RunError::Spawn(e)) => Err(MediaError::Io(e)),
        Err(RunError::Timeout(secs)) => Err(MediaError::Timeout(secs)),
        Err(RunError::Cancelled) => Err(MediaError::Cancelled),
    }
}
