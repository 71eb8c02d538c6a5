//! Device configuration.
//!
//! The top-level [`DeviceConfig`] is deserialized from JSON and describes
//! what the playback device can decode, the user's transcode preferences,
//! and the quality table. Every section defaults sensibly so a completely
//! empty `{}` file is valid. It answers the planner's [`Capabilities`]
//! queries directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::capabilities::{self, Capabilities, QualityTier};
use crate::error::Result;
use crate::media::QualityType;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level DeviceConfig
// ---------------------------------------------------------------------------

/// Root device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    #[serde(default = "default_client_identifier")]
    pub client_identifier: String,
    pub device: DeviceCapsConfig,
    pub preferences: PreferencesConfig,
    pub quality: QualityConfig,
}

fn default_client_identifier() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            client_identifier: default_client_identifier(),
            device: DeviceCapsConfig::default(),
            preferences: PreferencesConfig::default(),
            quality: QualityConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Deserialize a `DeviceConfig` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.client_identifier.trim().is_empty() {
            warnings.push("client_identifier is empty; transcode sessions will collide".into());
        }

        let valid_formats = ["hls", "mkv"];
        if !valid_formats.contains(&self.preferences.transcode_format.as_str()) {
            warnings.push(format!(
                "preferences.transcode_format '{}' is not recognized (valid: {})",
                self.preferences.transcode_format,
                valid_formats.join(", ")
            ));
        }

        let level = self.preferences.h264_level.as_str();
        if level != "auto" && level.parse::<u32>().is_err() {
            warnings.push(format!(
                "preferences.h264_level '{level}' is neither 'auto' nor a numeric level"
            ));
        }

        if self.quality.tiers.is_empty() {
            warnings.push("quality.tiers is empty; every transcode will fail".into());
        }

        for (name, index) in [
            ("local", self.quality.local),
            ("remote", self.quality.remote),
            ("online", self.quality.online),
        ] {
            if index >= self.quality.tiers.len() {
                warnings.push(format!(
                    "quality.{name} index {index} is out of range ({} tiers)",
                    self.quality.tiers.len()
                ));
            }
        }

        for (codec, channels) in &self.device.audio_codecs {
            if *channels == 0 {
                warnings.push(format!("device.audio_codecs.{codec} allows 0 channels"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// What the playback device can decode and render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCapsConfig {
    pub is_hd: bool,
    pub surround_sound: bool,
    pub hevc_support: bool,
    pub vp9_support: bool,
    pub supports_1080p60: bool,
    /// Decodable audio codecs and the maximum channel count for each.
    pub audio_codecs: BTreeMap<String, u32>,
}

impl Default for DeviceCapsConfig {
    fn default() -> Self {
        Self {
            is_hd: true,
            surround_sound: false,
            hevc_support: false,
            vp9_support: false,
            supports_1080p60: true,
            audio_codecs: BTreeMap::from([("aac".to_string(), 2), ("mp3".to_string(), 2)]),
        }
    }
}

/// User transcode preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    #[serde(default = "default_transcode_format")]
    pub transcode_format: String,
    #[serde(default = "default_auto")]
    pub burn_subtitles: String,
    #[serde(default = "default_auto")]
    pub h264_level: String,
    pub burned_subtitle_size: Option<String>,
    /// Any other preference, looked up verbatim by key.
    pub extra: BTreeMap<String, String>,
}

fn default_transcode_format() -> String {
    "hls".into()
}
fn default_auto() -> String {
    "auto".into()
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            transcode_format: default_transcode_format(),
            burn_subtitles: default_auto(),
            h264_level: default_auto(),
            burned_subtitle_size: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Transcode quality table and the tier chosen per server locality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub tiers: Vec<QualityTier>,
    pub local: usize,
    pub remote: usize,
    pub online: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let tier = |quality, width, height, max_bitrate| QualityTier {
            quality,
            resolution: (width, height),
            max_bitrate,
        };
        Self {
            tiers: vec![
                tier(30, 576, 320, 720),
                tier(40, 720, 480, 1500),
                tier(60, 1024, 768, 3000),
                tier(60, 1280, 720, 4000),
                tier(75, 1280, 720, 8000),
                tier(90, 1920, 1080, 12000),
                tier(100, 1920, 1080, 20000),
            ],
            local: 6,
            remote: 3,
            online: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

impl Capabilities for DeviceConfig {
    fn preference(&self, key: &str) -> Option<String> {
        match key {
            capabilities::PREF_TRANSCODE_FORMAT => Some(self.preferences.transcode_format.clone()),
            capabilities::PREF_BURN_SUBTITLES => Some(self.preferences.burn_subtitles.clone()),
            capabilities::PREF_H264_LEVEL => Some(self.preferences.h264_level.clone()),
            other => self.preferences.extra.get(other).cloned(),
        }
    }

    fn global_flag(&self, key: &str) -> bool {
        match key {
            capabilities::GLOBAL_IS_HD => self.device.is_hd,
            capabilities::GLOBAL_HEVC => self.device.hevc_support,
            capabilities::GLOBAL_VP9 => self.device.vp9_support,
            capabilities::GLOBAL_1080P60 => self.device.supports_1080p60,
            _ => false,
        }
    }

    fn client_identifier(&self) -> String {
        self.client_identifier.clone()
    }

    fn supports_audio_stream(&self, codec: &str, channels: u32) -> bool {
        self.device
            .audio_codecs
            .get(codec)
            .is_some_and(|max| channels <= *max)
    }

    fn supports_surround_sound(&self) -> bool {
        self.device.surround_sound
    }

    fn quality_index(&self, quality_type: QualityType) -> usize {
        match quality_type {
            QualityType::Local => self.quality.local,
            QualityType::Remote => self.quality.remote,
            QualityType::Online => self.quality.online,
        }
    }

    fn quality_tier(&self, index: usize) -> Option<QualityTier> {
        self.quality.tiers.get(index).cloned()
    }

    fn burned_subtitle_size(&self) -> Option<String> {
        self.preferences.burned_subtitle_size.clone()
    }
}
