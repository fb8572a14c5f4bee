//! HLS packaging of a rendition.

use std::path::{Path, PathBuf};

use vflix_models::encoding::{HLS_SEGMENT_SECONDS, HLS_START_NUMBER};

use crate::command::{FfmpegCommand, FfmpegRunner, RunError};
use crate::error::{MediaError, MediaResult};
use crate::paths::to_mounted_path;

/// Slice a rendition into an HLS playlist plus numbered `.ts` segments.
///
/// `output_prefix` is extended to `<prefix>.m3u8` for the manifest and
/// `<prefix>_%03d.ts` for the segments. The playlist is a full VOD asset:
/// every segment is retained (`-hls_list_size 0`) and the streams are
/// copied, not re-encoded. Returns the manifest path.
pub async fn package_hls(
    runner: &FfmpegRunner,
    rendition: &Path,
    output_prefix: &Path,
) -> MediaResult<PathBuf> {
    let manifest = PathBuf::from(format!("{}.m3u8", output_prefix.display()));
    let segment_pattern = format!("{}_%03d.ts", output_prefix.display());
    let segment_target = to_mounted_path(&segment_pattern)
        .to_string_lossy()
        .into_owned();

    let cmd = FfmpegCommand::new(to_mounted_path(rendition), to_mounted_path(&manifest))
        .codec_copy()
        .output_arg("-start_number")
        .output_arg(HLS_START_NUMBER.to_string())
        .output_arg("-hls_time")
        .output_arg(HLS_SEGMENT_SECONDS.to_string())
        .output_arg("-hls_list_size")
        .output_arg("0")
        .format("hls")
        .output_arg("-hls_segment_filename")
        .output_arg(segment_target);

    match runner.run(&cmd).await {
        Ok(()) => Ok(manifest),
        Err(RunError::Exited { exit_code, stderr }) => Err(MediaError::package_failed(
            format!(
                "ffmpeg exited with non-zero status packaging {}",
                rendition.display()
            ),
            stderr,
            exit_code,
        )),
        Err(RunError::Spawn(e)) => Err(MediaError::Io(e)),
        Err(RunError::Timeout(secs)) => Err(MediaError::Timeout(secs)),
        Err(RunError::Cancelled) => Err(MediaError::Cancelled),
    }
}
