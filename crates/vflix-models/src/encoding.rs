//! Fixed encoding configuration for the transcode ladder.
//!
//! Every rendition is encoded with the same codec and quality settings; only
//! the frame size varies per [`crate::Resolution`]. HLS packaging never
//! re-encodes, it stream-copies the rendition into segments.

/// Video codec for renditions (H.264).
pub const VIDEO_CODEC: &str = "libx264";
/// Audio codec for renditions.
pub const AUDIO_CODEC: &str = "aac";
/// Constant rate factor for renditions.
pub const TARGET_CRF: u8 = 23;

/// Target duration of one HLS segment, in seconds.
pub const HLS_SEGMENT_SECONDS: u32 = 10;
/// First segment index in the generated playlist.
pub const HLS_START_NUMBER: u32 = 0;
