//! The transcode resolution ladder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four renditions every catalog video is transcoded to.
///
/// The order of [`Resolution::ALL`] is the order the orchestrator processes
/// them in, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "360p")]
    R360,
    #[serde(rename = "480p")]
    R480,
    #[serde(rename = "720p")]
    R720,
    #[serde(rename = "1080p")]
    R1080,
}

impl Resolution {
    /// All target resolutions, in processing order.
    pub const ALL: [Resolution; 4] = [
        Resolution::R360,
        Resolution::R480,
        Resolution::R720,
        Resolution::R1080,
    ];

    /// Encode dimensions passed to the encoder (`-s`).
    pub fn dimensions(&self) -> &'static str {
        match self {
            Resolution::R360 => "640x360",
            Resolution::R480 => "854x480",
            Resolution::R720 => "1280x720",
            Resolution::R1080 => "1920x1080",
        }
    }

    /// Filename suffix for derived files (`video_360p.mp4`, `video_360p.m3u8`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Resolution::R360 => "360p",
            Resolution::R480 => "480p",
            Resolution::R720 => "720p",
            Resolution::R1080 => "1080p",
        }
    }

    /// Vertical line count.
    pub fn height(&self) -> u32 {
        match self {
            Resolution::R360 => 360,
            Resolution::R480 => 480,
            Resolution::R720 => 720,
            Resolution::R1080 => 1080,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Error returned when parsing an unknown resolution label.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resolution: {0}")]
pub struct ResolutionParseError(pub String);

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "360" | "360p" => Ok(Resolution::R360),
            "480" | "480p" => Ok(Resolution::R480),
            "720" | "720p" => Ok(Resolution::R720),
            "1080" | "1080p" => Ok(Resolution::R1080),
            other => Err(ResolutionParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_order_is_ascending() {
        let heights: Vec<u32> = Resolution::ALL.iter().map(|r| r.height()).collect();
        assert_eq!(heights, vec![360, 480, 720, 1080]);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(Resolution::R360.dimensions(), "640x360");
        assert_eq!(Resolution::R480.dimensions(), "854x480");
        assert_eq!(Resolution::R720.dimensions(), "1280x720");
        assert_eq!(Resolution::R1080.dimensions(), "1920x1080");
    }

    #[test]
    fn test_parse_accepts_bare_and_suffixed() {
        assert_eq!("360".parse::<Resolution>().unwrap(), Resolution::R360);
        assert_eq!("1080p".parse::<Resolution>().unwrap(), Resolution::R1080);
        assert!("4k".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_serde_uses_suffix() {
        let json = serde_json::to_string(&Resolution::R720).unwrap();
        assert_eq!(json, "\"720p\"");
        let back: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Resolution::R720);
    }
}
