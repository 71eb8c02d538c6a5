//! Media domain model: renditions, parts, and stream choices.
//!
//! These records arrive already deserialized from the media server's
//! responses. Everything here is immutable for the duration of one playback
//! session; the planner only reads it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Delivery protocol of a rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Single progressive file served over HTTP.
    #[default]
    #[serde(alias = "http")]
    Progressive,
    /// Adaptive streaming manifest.
    Hls,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progressive => write!(f, "progressive"),
            Self::Hls => write!(f, "hls"),
        }
    }
}

// ---------------------------------------------------------------------------
// Part
// ---------------------------------------------------------------------------

/// One playable segment of a rendition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    /// Absolute server path of the part file.
    pub key: String,
    /// Duration in milliseconds, if the server reported one.
    pub duration_ms: Option<u64>,
    /// Whether the server has pre-built timeline thumbnail indexes.
    pub indexed: bool,
    /// Standard-definition timeline index path.
    pub sd_index_path: Option<String>,
    /// High-definition timeline index path.
    pub hd_index_path: Option<String>,
}

impl Part {
    /// Duration in whole seconds, treating a missing duration as zero.
    pub fn duration_secs(&self) -> u64 {
        self.duration_ms.unwrap_or(0) / 1000
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// A single rendition of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    pub parts: Vec<Part>,
    pub duration_ms: Option<u64>,
    pub container: Option<String>,
    /// Nominal bitrate in kbps.
    pub bitrate: Option<u32>,
    /// Resolution label as reported by the server ("1080", "720", "4k", "sd").
    pub video_resolution: Option<String>,
    /// Coarse frame rate category ("24p", "NTSC", "PAL", ...).
    pub video_frame_rate: Option<String>,
    pub protocol: Protocol,
    /// Position among the item's alternate versions.
    pub media_index: Option<u32>,
    /// Header hints supplied alongside indirect (relayed) manifests.
    pub indirect_headers: BTreeMap<String, String>,
}

impl Media {
    /// Vertical resolution in lines, or 0 when the label is not numeric.
    pub fn vertical_resolution(&self) -> u32 {
        match self.video_resolution.as_deref() {
            Some(label) if label.eq_ignore_ascii_case("4k") => 2160,
            Some(label) => label.trim_end_matches(['p', 'P']).parse().unwrap_or(0),
            None => 0,
        }
    }

    /// Numeric frame rate for the coarse category.
    ///
    /// A missing category is treated as film rate; categories without a
    /// mapping yield `None`, leaving the player to its own default.
    pub fn frame_rate(&self) -> Option<u32> {
        match self.video_frame_rate.as_deref().unwrap_or("24p") {
            "24p" => Some(24),
            "NTSC" => Some(30),
            _ => None,
        }
    }

    /// Rendition duration in milliseconds, zero if unknown.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// The audio stream chosen for playback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioStream {
    pub codec: Option<String>,
    pub language_code: Option<String>,
    pub channels: Option<u32>,
    /// Sample rate in Hz.
    pub sampling_rate: Option<u32>,
}

/// The subtitle stream chosen for playback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStream {
    /// Zero-based stream index within the container.
    pub index: u32,
    pub codec: Option<String>,
    pub language_code: Option<String>,
    /// Server path of the side-loadable subtitle file.
    pub key: Option<String>,
}

/// How the chosen subtitle stream reaches the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleDecision {
    /// No subtitles.
    #[default]
    None,
    /// Side-loaded from a separate URL.
    SoftSideload,
    /// Selected from a track inside the direct-played container.
    SoftContainer,
    /// Burned into the video by the transcoder.
    Burn,
}

/// Externally supplied decision snapshot for an item or one of its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamChoice {
    pub is_direct_playable: bool,
    pub audio_stream: Option<AudioStream>,
    pub subtitle_stream: Option<SubtitleStream>,
    pub subtitle_decision: SubtitleDecision,
    pub has_burned_subtitles: bool,
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Network locality of the backing server, used to pick a quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityType {
    #[default]
    Local,
    Remote,
    Online,
}

impl fmt::Display for QualityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
            Self::Online => write!(f, "online"),
        }
    }
}

/// Quality flag advertised to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamQuality {
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "SD")]
    Sd,
}

impl fmt::Display for StreamQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hd => write!(f, "HD"),
            Self::Sd => write!(f, "SD"),
        }
    }
}
