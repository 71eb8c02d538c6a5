//! Item-level collaborators: the playable item, per-part stream decisions,
//! and live manifest probing.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::media::{Media, QualityType, StreamChoice};
use crate::server::Server;

/// Media type requested when locating a transcode server.
pub const MEDIA_TYPE_VIDEO: &str = "video";

/// A logical playable entity with one selected rendition.
pub trait MediaItem: Send + Sync {
    /// Stable key identifying the item (its metadata path).
    fn key(&self) -> &str;

    /// The rendition selected for this session.
    fn media(&self) -> &Media;

    /// The server backing this item.
    fn server(&self) -> Option<Arc<dyn Server>>;

    /// Locate a server able to transcode this item.
    fn transcode_server(&self, required: bool, media_type: &str) -> Option<Arc<dyn Server>>;

    /// Absolute path of one of the item's path attributes (e.g. "key").
    fn absolute_path(&self, field: &str) -> String;

    /// Locality of `server` relative to this device.
    fn quality_type(&self, server: &dyn Server) -> QualityType;
}

/// Decides direct playability for an individual part.
pub trait StreamDecider: Send + Sync {
    /// Evaluate the part at `part_index` of `media` on its own merits.
    fn evaluate_part(&self, item: &dyn MediaItem, media: &Media, part_index: usize) -> StreamChoice;
}

/// Decides whether an adaptive manifest is an unbounded live stream.
pub trait ManifestProbe: Send + Sync {
    /// Inspect the manifest at `url`.
    ///
    /// `headers` are the request headers an indirect manifest must be fetched
    /// with. Probes that do not fetch, such as a pre-filled cache, ignore them.
    fn is_live(&self, url: &str, headers: &BTreeMap<String, String>) -> bool;
}

/// Probe that treats every manifest as on-demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnDemand;

impl ManifestProbe for AssumeOnDemand {
    fn is_live(&self, _url: &str, _headers: &BTreeMap<String, String>) -> bool {
        false
    }
}
