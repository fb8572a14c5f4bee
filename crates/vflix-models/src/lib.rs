//! Shared data models for the Videoflix backend.
//!
//! This crate provides Serde-serializable types for:
//! - Catalog video records and their per-resolution HLS manifest fields
//! - The transcode resolution ladder
//! - Derived storage layout under the media root
//! - Encoding constants shared by the media layer

pub mod encoding;
pub mod job;
pub mod resolution;
pub mod storage;
pub mod video;

// Re-export common types
pub use job::JobId;
pub use resolution::{Resolution, ResolutionParseError};
pub use storage::{sanitize_title, StorageLayout};
pub use video::{Video, VideoId};
