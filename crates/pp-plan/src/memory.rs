//! In-memory collaborators.
//!
//! These implement the planner's collaborator traits over plain data so the
//! planner can run without a live server: the `playplan` CLI loads them from
//! session files, and the tests build them inline.

use pp_core::{ManifestProbe, Media, MediaItem, QualityType, Server, StreamChoice, StreamDecider};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;

/// Query parameter carrying the server auth token.
pub const TOKEN_PARAM: &str = "X-Plex-Token";

/// Host fragment identifying URLs minted by the legacy channel node.
const CHANNEL_NODE_MARKER: &str = "://node.plexapp.com";

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A server with a fixed base URL, token, and feature set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoryServer {
    pub name: String,
    pub base_url: String,
    pub token: Option<String>,
    pub features: BTreeSet<String>,
    /// Marks the cloud relay, whose paths must be swizzled before use.
    pub relay: bool,
    /// Server that re-homes legacy channel node URLs for the relay.
    pub channel_server: Option<Box<MemoryServer>>,
}

impl MemoryServer {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn as_relay(mut self) -> Self {
        self.relay = true;
        self
    }

    pub fn with_channel_server(mut self, server: MemoryServer) -> Self {
        self.channel_server = Some(Box::new(server));
        self
    }

    fn join(&self, path: &str) -> String {
        if path.contains("://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn with_token_param(&self, url: String) -> String {
        let Some(token) = self.token.as_deref() else {
            return url;
        };
        match Url::parse(&url) {
            Ok(mut parsed) => {
                parsed.query_pairs_mut().append_pair(TOKEN_PARAM, token);
                parsed.into()
            }
            Err(e) => {
                tracing::warn!(url = %url, "Cannot attach token to unparseable url: {e}");
                url
            }
        }
    }
}

impl Server for MemoryServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_url(&self, path: &str, include_token: bool) -> String {
        if self.relay && path.contains(CHANNEL_NODE_MARKER) {
            if let Some(swizzled) = self
                .channel_server
                .as_deref()
                .and_then(|channel| channel.swizzle_url(path, include_token))
            {
                return swizzled;
            }
        }

        let url = self.join(path);
        if include_token {
            self.with_token_param(url)
        } else {
            url
        }
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn is_request_to_server(&self, url: &str) -> bool {
        if url.starts_with('/') {
            return true;
        }
        match (Url::parse(url), Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => target.origin() == base.origin(),
            _ => false,
        }
    }

    fn supports_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    fn swizzle_url(&self, url: &str, include_token: bool) -> Option<String> {
        if url.starts_with('/') {
            return Some(self.build_url(url, include_token));
        }

        let parsed = Url::parse(url).ok()?;
        if !parsed.has_host() {
            return None;
        }
        let mut path = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }
        Some(self.build_url(&path, include_token))
    }

    fn is_relay(&self) -> bool {
        self.relay
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A media item over a fixed rendition and fixed servers.
#[derive(Clone)]
pub struct StaticItem {
    key: String,
    media: Media,
    server: Option<Arc<dyn Server>>,
    transcode_server: Option<Arc<dyn Server>>,
    quality_type: QualityType,
    attributes: BTreeMap<String, String>,
}

impl StaticItem {
    pub fn new(key: impl Into<String>, media: Media) -> Self {
        Self {
            key: key.into(),
            media,
            server: None,
            transcode_server: None,
            quality_type: QualityType::Local,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_server(mut self, server: Arc<dyn Server>) -> Self {
        self.server = Some(server);
        self
    }

    /// Route transcodes to `server` instead of the item's own server.
    pub fn with_transcode_server(mut self, server: Arc<dyn Server>) -> Self {
        self.transcode_server = Some(server);
        self
    }

    pub fn with_quality_type(mut self, quality_type: QualityType) -> Self {
        self.quality_type = quality_type;
        self
    }

    /// Set an extra path attribute resolvable through `absolute_path`.
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }
}

impl std::fmt::Debug for StaticItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticItem")
            .field("key", &self.key)
            .field("parts", &self.media.parts.len())
            .field("server", &self.server.as_ref().map(|s| s.name().to_string()))
            .field(
                "transcode_server",
                &self.transcode_server.as_ref().map(|s| s.name().to_string()),
            )
            .field("quality_type", &self.quality_type)
            .finish()
    }
}

impl MediaItem for StaticItem {
    fn key(&self) -> &str {
        &self.key
    }

    fn media(&self) -> &Media {
        &self.media
    }

    fn server(&self) -> Option<Arc<dyn Server>> {
        self.server.clone()
    }

    fn transcode_server(&self, _required: bool, _media_type: &str) -> Option<Arc<dyn Server>> {
        // The relay cannot transcode; without an explicit transcoder there is none.
        self.transcode_server
            .clone()
            .or_else(|| self.server.clone().filter(|s| !s.is_relay()))
    }

    fn absolute_path(&self, field: &str) -> String {
        let value = if field == "key" {
            self.key.as_str()
        } else {
            self.attributes.get(field).map(String::as_str).unwrap_or("")
        };
        if value.starts_with('/') || value.contains("://") {
            value.to_string()
        } else {
            format!("/library/metadata/{value}")
        }
    }

    fn quality_type(&self, _server: &dyn Server) -> QualityType {
        self.quality_type
    }
}

// ---------------------------------------------------------------------------
// Decider
// ---------------------------------------------------------------------------

/// Per-part direct play verdicts with a fallback, recording every evaluation.
#[derive(Debug, Default)]
pub struct MemoryDecider {
    default_direct: bool,
    overrides: BTreeMap<usize, bool>,
    evaluated: Mutex<Vec<usize>>,
}

impl MemoryDecider {
    pub fn new(default_direct: bool) -> Self {
        Self {
            default_direct,
            ..Self::default()
        }
    }

    pub fn with_part(mut self, part_index: usize, direct: bool) -> Self {
        self.overrides.insert(part_index, direct);
        self
    }

    /// Part indices evaluated so far, in call order.
    pub fn evaluated(&self) -> Vec<usize> {
        self.evaluated.lock().clone()
    }
}

impl StreamDecider for MemoryDecider {
    fn evaluate_part(&self, _item: &dyn MediaItem, _media: &Media, part_index: usize) -> StreamChoice {
        self.evaluated.lock().push(part_index);
        StreamChoice {
            is_direct_playable: self
                .overrides
                .get(&part_index)
                .copied()
                .unwrap_or(self.default_direct),
            ..StreamChoice::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest probe
// ---------------------------------------------------------------------------

/// Whether playlist text describes an unbounded live stream.
///
/// A playlist is live unless it carries an end tag or declares itself VOD.
pub fn is_live_playlist(text: &str) -> bool {
    let mut ended = false;
    for line in text.lines().map(str::trim) {
        if line == "#EXT-X-ENDLIST" || line == "#EXT-X-PLAYLIST-TYPE:VOD" {
            ended = true;
        }
    }
    !ended
}

/// Liveness answered from manifests fetched ahead of time.
///
/// Lookups are by URL alone; fetch headers were already applied when the
/// manifests were collected.
#[derive(Debug, Clone, Default)]
pub struct ManifestCache {
    manifests: BTreeMap<String, String>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.manifests.insert(url.into(), text.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) {
        self.manifests.insert(url.into(), text.into());
    }
}

impl ManifestProbe for ManifestCache {
    fn is_live(&self, url: &str, _headers: &BTreeMap<String, String>) -> bool {
        match self.manifests.get(url) {
            Some(text) => is_live_playlist(text),
            None => {
                tracing::debug!(url, "No cached manifest; assuming on-demand");
                false
            }
        }
    }
}
