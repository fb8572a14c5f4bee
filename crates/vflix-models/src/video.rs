//! Catalog video records.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resolution::Resolution;

/// Numeric identifier of a catalog video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct VideoId(pub i64);

impl VideoId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A video record as stored by the catalog.
///
/// The transcode pipeline reads `title` and `source_file` and writes the four
/// `hls_*` manifest fields. Everything else belongs to the catalog and is
/// carried through untouched.
///
/// A manifest field is either `None` (not yet transcoded, or transcoding
/// failed) or a path, relative to the media root, of a playable `.m3u8`
/// manifest whose segments exist next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Catalog id.
    pub id: VideoId,

    /// Human-entered title. Storage directories are derived from it at
    /// creation time; renaming later does not move existing files.
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: Option<String>,

    /// Uploaded source file, relative to the media root. Immutable after
    /// upload.
    pub source_file: String,

    /// Thumbnail image, relative to the media root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_360: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_480: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_720: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_1080: Option<String>,
}

impl Video {
    /// Create a new record with empty manifest fields.
    pub fn new(id: VideoId, title: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            category: None,
            source_file: source_file.into(),
            thumbnail: None,
            created_at: Utc::now(),
            hls_360: None,
            hls_480: None,
            hls_720: None,
            hls_1080: None,
        }
    }

    /// Attach a thumbnail path.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Manifest path for one resolution, if transcoded.
    pub fn manifest(&self, resolution: Resolution) -> Option<&str> {
        match resolution {
            Resolution::R360 => self.hls_360.as_deref(),
            Resolution::R480 => self.hls_480.as_deref(),
            Resolution::R720 => self.hls_720.as_deref(),
            Resolution::R1080 => self.hls_1080.as_deref(),
        }
    }

    /// Record a manifest path for one resolution.
    pub fn set_manifest(&mut self, resolution: Resolution, path: impl Into<String>) {
        let slot = match resolution {
            Resolution::R360 => &mut self.hls_360,
            Resolution::R480 => &mut self.hls_480,
            Resolution::R720 => &mut self.hls_720,
            Resolution::R1080 => &mut self.hls_1080,
        };
        *slot = Some(path.into());
    }

    /// True once every resolution has a manifest.
    pub fn is_fully_transcoded(&self) -> bool {
        Resolution::ALL.iter().all(|r| self.manifest(*r).is_some())
    }

    /// Base name of the source file without its extension, used to name every
    /// derived file (`video.mp4` -> `video_360p.m3u8`).
    pub fn source_stem(&self) -> Option<&str> {
        Path::new(&self.source_file).file_stem()?.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Video {
        Video::new(VideoId(1), "Test Video", "videos/Test_Video/video.mp4")
    }

    #[test]
    fn test_new_record_has_no_manifests() {
        let video = sample();
        for resolution in Resolution::ALL {
            assert!(video.manifest(resolution).is_none());
        }
        assert!(!video.is_fully_transcoded());
    }

    #[test]
    fn test_set_manifest_round_trips() {
        let mut video = sample();
        video.set_manifest(
            Resolution::R360,
            "videos/Test_Video/HLS_files/video_360p.m3u8",
        );
        assert_eq!(
            video.manifest(Resolution::R360),
            Some("videos/Test_Video/HLS_files/video_360p.m3u8")
        );
        assert!(video.manifest(Resolution::R480).is_none());
    }

    #[test]
    fn test_fully_transcoded_after_all_four() {
        let mut video = sample();
        for resolution in Resolution::ALL {
            video.set_manifest(resolution, format!("x_{}.m3u8", resolution.suffix()));
        }
        assert!(video.is_fully_transcoded());
    }

    #[test]
    fn test_source_stem() {
        assert_eq!(sample().source_stem(), Some("video"));

        let nested = Video::new(VideoId(2), "T", "videos/T/my.clip.mp4");
        assert_eq!(nested.source_stem(), Some("my.clip"));
    }

    #[test]
    fn test_serde_skips_empty_manifests() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("hls_360"));

        let mut video = sample();
        video.set_manifest(Resolution::R1080, "m.m3u8");
        let json = serde_json::to_string(&video).unwrap();
        assert!(json.contains("hls_1080"));

        let back: Video = serde_json::from_str(&json).unwrap();
        assert_eq!(back, video);
    }
}
