//! Shared fixtures for integration tests.
//!
//! Provides [`TestHarness`], which wires in-memory collaborators into a
//! [`PlaybackPlanner`], plus helpers for fixture files and query decoding.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use pp_core::{DeviceConfig, Media, Part, Server, StreamChoice};
use pp_plan::memory::{MemoryDecider, MemoryServer, StaticItem};
use pp_plan::PlaybackPlanner;

pub const BASE_URL: &str = "http://10.0.0.5:32400";
pub const TOKEN: &str = "secret";

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// The local server every harness item is backed by.
pub fn den() -> MemoryServer {
    MemoryServer::new("den", BASE_URL)
        .with_token(TOKEN)
        .with_feature(pp_core::server::FEATURE_MKV_TRANSCODE)
}

/// `count` parts of `duration_ms` each.
pub fn media(count: usize, duration_ms: u64) -> Media {
    Media {
        parts: (0..count)
            .map(|i| Part {
                key: format!("/library/parts/{}/file.mkv", i + 100),
                duration_ms: Some(duration_ms),
                ..Part::default()
            })
            .collect(),
        duration_ms: Some(duration_ms * count as u64),
        container: Some("mkv".into()),
        bitrate: Some(10_000),
        video_resolution: Some("1080".into()),
        ..Media::default()
    }
}

/// Decoded query parameters of `url`, last value wins.
pub fn query(url: &str) -> HashMap<String, String> {
    url::Url::parse(url)
        .expect("valid url")
        .query_pairs()
        .into_owned()
        .collect()
}

/// Builder for a planner over in-memory collaborators.
pub struct TestHarness {
    pub media: Media,
    pub server: Option<Arc<dyn Server>>,
    pub choice: StreamChoice,
    pub config: DeviceConfig,
    pub decider: Arc<MemoryDecider>,
}

impl TestHarness {
    /// A harness over `media` on the local server, with a fixed session id.
    pub fn new(media: Media) -> Self {
        let mut config = DeviceConfig::default();
        config.client_identifier = "test-client".into();
        Self {
            media,
            server: Some(Arc::new(den())),
            choice: StreamChoice::default(),
            config,
            decider: Arc::new(MemoryDecider::new(true)),
        }
    }

    pub fn direct_playable(mut self, direct: bool) -> Self {
        self.choice.is_direct_playable = direct;
        self.decider = Arc::new(MemoryDecider::new(direct));
        self
    }

    pub fn server(mut self, server: Option<Arc<dyn Server>>) -> Self {
        self.server = server;
        self
    }

    pub fn planner(&self) -> PlaybackPlanner {
        let mut item = StaticItem::new("/library/metadata/42", self.media.clone());
        if let Some(server) = &self.server {
            item = item.with_server(server.clone());
        }
        PlaybackPlanner::new(
            Arc::new(item),
            self.choice.clone(),
            Arc::new(self.config.clone()),
            self.decider.clone(),
        )
    }
}
