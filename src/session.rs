//! Session files.
//!
//! A session file is a JSON snapshot of everything the planner consumes for
//! one playback: the backing server, an optional dedicated transcoder, the
//! item with its selected rendition, the stream choice, per-part verdicts for
//! re-evaluated parts, and any pre-fetched HLS manifests.
//!
//! ```json
//! {
//!   "server": { "name": "den", "base_url": "http://10.0.0.5:32400", "token": "abc" },
//!   "item": { "key": "/library/metadata/42" },
//!   "media": { "parts": [{ "key": "/library/parts/1/file.mkv", "duration_ms": 600000 }] },
//!   "choice": { "is_direct_playable": true }
//! }
//! ```

use anyhow::{Context, Result};
use pp_core::{Capabilities, DeviceConfig, Media, QualityType, Server, StreamChoice};
use pp_plan::memory::{ManifestCache, MemoryDecider, MemoryServer, StaticItem};
use pp_plan::PlaybackPlanner;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// The item section of a session file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionItem {
    pub key: String,
    pub quality_type: QualityType,
    /// Extra path attributes, keyed by field name.
    pub attributes: BTreeMap<String, String>,
}

/// Verdicts returned when later parts are re-evaluated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PartVerdicts {
    /// Fallback verdict; the item's own choice when absent.
    pub direct_playable: Option<bool>,
    /// Verdicts for individual part indices.
    pub parts: BTreeMap<usize, bool>,
}

/// A parsed session file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Session {
    pub server: Option<MemoryServer>,
    pub transcode_server: Option<MemoryServer>,
    pub item: SessionItem,
    pub media: Media,
    pub choice: StreamChoice,
    pub verdicts: PartVerdicts,
    /// Manifest text keyed by the exact URL the planner will request.
    pub manifests: BTreeMap<String, String>,
}

impl Session {
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).context("invalid session file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("failed to parse session file {}", path.display()))
    }

    /// Wire the session's collaborators into a planner.
    pub fn planner(&self, config: DeviceConfig) -> PlaybackPlanner {
        let mut item = StaticItem::new(self.item.key.clone(), self.media.clone())
            .with_quality_type(self.item.quality_type);
        if let Some(server) = &self.server {
            let server: Arc<dyn Server> = Arc::new(server.clone());
            item = item.with_server(server);
        }
        if let Some(transcoder) = &self.transcode_server {
            let transcoder: Arc<dyn Server> = Arc::new(transcoder.clone());
            item = item.with_transcode_server(transcoder);
        }
        for (field, value) in &self.item.attributes {
            item = item.with_attribute(field.clone(), value.clone());
        }

        let fallback = self
            .verdicts
            .direct_playable
            .unwrap_or(self.choice.is_direct_playable);
        let decider = self
            .verdicts
            .parts
            .iter()
            .fold(MemoryDecider::new(fallback), |decider, (index, direct)| {
                decider.with_part(*index, *direct)
            });

        let probe = self
            .manifests
            .iter()
            .fold(ManifestCache::new(), |cache, (url, text)| {
                cache.with_manifest(url.clone(), text.clone())
            });

        let capabilities: Arc<dyn Capabilities> = Arc::new(config);
        PlaybackPlanner::new(
            Arc::new(item),
            self.choice.clone(),
            capabilities,
            Arc::new(decider),
        )
        .with_manifest_probe(Arc::new(probe))
    }
}
