//! FFmpeg CLI wrapper for the HLS transcode pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - An async runner with deadline and cancellation support
//! - The two pipeline stages: resolution encoding and HLS packaging
//! - Host-to-mounted path translation for split filesystem namespaces
//! - Best-effort filesystem cleanup helpers

pub mod command;
pub mod error;
pub mod fs_utils;
pub mod hls;
pub mod paths;
pub mod pipeline;
pub mod transcode;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner, RunError};
pub use error::{MediaError, MediaResult};
pub use hls::package_hls;
pub use paths::to_mounted_path;
pub use pipeline::{FfmpegPipeline, TranscodePipeline};
pub use transcode::transcode_to_resolution;
