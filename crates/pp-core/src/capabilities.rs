//! The [`Capabilities`] trait: read-only device and user settings.

use serde::{Deserialize, Serialize};

use crate::media::QualityType;

/// Preference key selecting the transcode container ("hls" or "mkv").
pub const PREF_TRANSCODE_FORMAT: &str = "transcode_format";
/// Preference key for subtitle burning ("auto", "image", "always", ...).
pub const PREF_BURN_SUBTITLES: &str = "burn_subtitles";
/// Preference key capping the H.264 level ("auto" or a level like "41").
pub const PREF_H264_LEVEL: &str = "h264_level";

/// Global flag: device renders HD output.
pub const GLOBAL_IS_HD: &str = "IsHD";
/// Global flag: device decodes HEVC.
pub const GLOBAL_HEVC: &str = "hevcSupport";
/// Global flag: device decodes VP9.
pub const GLOBAL_VP9: &str = "vp9Support";
/// Global flag: device decodes 1080p at 60 frames per second.
pub const GLOBAL_1080P60: &str = "supports1080p60";

/// One row of the transcode quality table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityTier {
    /// Transcoder quality percentage.
    pub quality: u32,
    /// Target resolution as (width, height).
    pub resolution: (u32, u32),
    /// Maximum video bitrate in kbps.
    pub max_bitrate: u32,
}

impl QualityTier {
    /// Resolution formatted the way the transcoder expects ("1920x1080").
    pub fn resolution_param(&self) -> String {
        format!("{}x{}", self.resolution.0, self.resolution.1)
    }
}

/// Read-only view of device capabilities and user preferences.
///
/// Passed explicitly into the planner so tests can substitute fakes.
pub trait Capabilities: Send + Sync {
    /// A user preference by key, if set.
    fn preference(&self, key: &str) -> Option<String>;

    /// A user preference by key, falling back to `default`.
    fn preference_or(&self, key: &str, default: &str) -> String {
        self.preference(key).unwrap_or_else(|| default.to_string())
    }

    /// A boolean device flag by key; unknown keys are `false`.
    fn global_flag(&self, key: &str) -> bool;

    /// Identifier sent as the transcode session.
    fn client_identifier(&self) -> String;

    /// Whether the device can decode `codec` with `channels` channels.
    fn supports_audio_stream(&self, codec: &str, channels: u32) -> bool;

    /// Whether the device outputs surround sound at all.
    fn supports_surround_sound(&self) -> bool;

    /// Index into the quality table for a server locality.
    fn quality_index(&self, quality_type: QualityType) -> usize;

    /// The quality table row at `index`.
    fn quality_tier(&self, index: usize) -> Option<QualityTier>;

    /// Caption size to request when subtitles are burned in.
    fn burned_subtitle_size(&self) -> Option<String> {
        None
    }
}
