//! Part chain assembly and navigation.
//!
//! [`PlaybackPlanner`] owns one playback session's chain. `build` discards
//! whatever chain exists and assembles a new one from the requested seek
//! position; the navigator methods then walk it as the player finishes parts.

use pp_core::capabilities::GLOBAL_IS_HD;
use pp_core::item::MEDIA_TYPE_VIDEO;
use pp_core::{
    AssumeOnDemand, Capabilities, Error, ManifestProbe, Media, MediaItem, Result, Server,
    StreamChoice, StreamDecider, StreamQuality, SubtitleDecision,
};
use std::sync::Arc;

use crate::chain::PartChain;
use crate::context::PlanContext;
use crate::descriptor::{PartInfo, PlaybackDescriptor, SubtitleConfig};
use crate::direct::build_direct_play;
use crate::transcode::build_transcode;

/// Seconds past "now" used as the start position of a live stream, which
/// the player clamps to the live edge.
pub const LIVE_EDGE_BUFFER_SECS: i64 = 1800;

/// Parameters of one `build` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    /// Requested position from the start of the item, in milliseconds.
    pub seek_ms: u64,
    /// `Some(true)` forces direct play, `Some(false)` forces a transcode.
    pub forced_direct_play: Option<bool>,
    /// Whether the transcoder may copy compatible streams untouched.
    pub allow_direct_stream: bool,
    /// Part the player is on; the scan starts here.
    pub current_part_index: Option<usize>,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            seek_ms: 0,
            forced_direct_play: None,
            allow_direct_stream: true,
            current_part_index: None,
        }
    }
}

impl PlanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seek_ms(mut self, seek_ms: u64) -> Self {
        self.seek_ms = seek_ms;
        self
    }

    pub fn force_direct_play(mut self, direct: bool) -> Self {
        self.forced_direct_play = Some(direct);
        self
    }

    pub fn allow_direct_stream(mut self, allow: bool) -> Self {
        self.allow_direct_stream = allow;
        self
    }

    pub fn current_part(mut self, part_index: usize) -> Self {
        self.current_part_index = Some(part_index);
        self
    }

    fn seek_secs(&self) -> u64 {
        self.seek_ms / 1000
    }
}

/// Builds and navigates the part chain for one playback session.
pub struct PlaybackPlanner {
    item: Arc<dyn MediaItem>,
    choice: StreamChoice,
    capabilities: Arc<dyn Capabilities>,
    decider: Arc<dyn StreamDecider>,
    probe: Arc<dyn ManifestProbe>,
    chain: PartChain,
}

impl PlaybackPlanner {
    pub fn new(
        item: Arc<dyn MediaItem>,
        choice: StreamChoice,
        capabilities: Arc<dyn Capabilities>,
        decider: Arc<dyn StreamDecider>,
    ) -> Self {
        Self {
            item,
            choice,
            capabilities,
            decider,
            probe: Arc::new(AssumeOnDemand),
            chain: PartChain::new(),
        }
    }

    /// Use `probe` to decide whether direct-played HLS manifests are live.
    pub fn with_manifest_probe(mut self, probe: Arc<dyn ManifestProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Build a fresh chain and return its head.
    ///
    /// The previous chain is discarded first, so after an `Err` no chain is
    /// exposed at all.
    pub fn build(&mut self, request: &PlanRequest) -> Result<&PlaybackDescriptor> {
        self.chain.clear();
        self.chain = self.assemble(request)?;
        self.chain.head().ok_or(Error::NoParts)
    }

    /// The descriptor the player should be consuming.
    pub fn active(&self) -> Option<&PlaybackDescriptor> {
        self.chain.head()
    }

    pub fn chain(&self) -> &PartChain {
        &self.chain
    }

    pub fn has_more_parts(&self) -> bool {
        self.chain.has_more_parts()
    }

    /// Move on to the next part. Returns `false` when there is none.
    pub fn advance(&mut self) -> bool {
        if !self.chain.advance() {
            return false;
        }
        if let Some(head) = self.chain.head() {
            tracing::info!(
                part_index = head.part_index(),
                start_offset = head.start_offset(),
                "Next part set for playback"
            );
        }
        true
    }

    /// Timeline thumbnail URL for `offset_ms` into the active part.
    ///
    /// Prefers the high-definition index. `None` without a server, an active
    /// part, or an index path.
    pub fn timeline_thumbnail_url(&self, offset_ms: u64) -> Option<String> {
        let server = self.item.server()?;
        let active = self.chain.head()?;
        let path = active
            .info
            .hd_bif_path
            .as_deref()
            .or(active.info.sd_bif_path.as_deref())?;
        Some(server.build_url(&format!("{path}/{offset_ms}"), true))
    }

    fn assemble(&self, request: &PlanRequest) -> Result<PartChain> {
        let item = self.item.as_ref();
        let media = item.media();
        if media.parts.is_empty() {
            tracing::warn!(item = item.key(), "Selected media has no parts");
            return Err(Error::NoParts);
        }

        let start_part_index = request.current_part_index.unwrap_or(0);
        if start_part_index >= media.parts.len() {
            return Err(Error::part_build(
                start_part_index,
                format!("media has only {} parts", media.parts.len()),
            ));
        }

        let is_forced = request.forced_direct_play.is_some();
        let direct_play = request
            .forced_direct_play
            .unwrap_or(self.choice.is_direct_playable);
        match request.forced_direct_play {
            Some(true) => tracing::info!("Forced direct play"),
            Some(false) => tracing::info!(
                allow_direct_stream = request.allow_direct_stream,
                "Forced transcode"
            ),
            None => {}
        }

        let server = item.server();
        let base_info = self.item_info(media, server.as_deref());
        let seek_secs = request.seek_secs();
        let ctx = PlanContext {
            item,
            media,
            choice: &self.choice,
            capabilities: self.capabilities.as_ref(),
            probe: self.probe.as_ref(),
            seek_secs,
        };

        let mut chain = PartChain::new();
        let mut prev: Option<usize> = None;
        let mut start_offset: u64 = 0;

        for (part_index, part) in media.parts.iter().enumerate().skip(start_part_index) {
            let is_current_part = request.current_part_index == Some(part_index);

            let mut info = base_info.clone();
            info.part_index = part_index;
            info.start_offset = start_offset;
            if part.indexed {
                info.sd_bif_path = part.sd_index_path.clone();
                info.hd_bif_path = part.hd_index_path.clone();
            }

            let first_scanned = part_index == 0 || part_index == start_part_index;
            let trust_supplied = first_scanned || (is_forced && !is_current_part) || is_current_part;
            let can_direct_play = if trust_supplied {
                direct_play
            } else {
                let choice = self.decider.evaluate_part(item, media, part_index);
                tracing::debug!(
                    part_index,
                    direct_playable = choice.is_direct_playable,
                    "Re-evaluated part"
                );
                choice.is_direct_playable
            };

            let descriptor = if can_direct_play {
                build_direct_play(&ctx, info, part_index)?
            } else {
                let transcode_server = item
                    .transcode_server(true, MEDIA_TYPE_VIDEO)
                    .ok_or_else(|| {
                        tracing::warn!(item = item.key(), part_index, "No transcode server");
                        Error::no_transcode_server(item.key())
                    })?;
                build_transcode(
                    &ctx,
                    transcode_server.as_ref(),
                    info,
                    part_index,
                    request.allow_direct_stream,
                    is_current_part,
                )?
            };
            tracing::debug!(part_index, direct = can_direct_play, start_offset, "Built part");

            let slot = chain.push(descriptor);
            match prev {
                None => chain.set_head(slot),
                Some(_) if start_offset > 0 && seek_secs >= start_offset => {
                    // The seek lands in this part or later: it becomes the head.
                    if let Some(descriptor) = chain.get_mut(slot) {
                        descriptor.previous = prev;
                    }
                    chain.set_head(slot);
                }
                Some(p) => {
                    if let Some(previous) = chain.get_mut(p) {
                        previous.next = Some(slot);
                    }
                }
            }

            start_offset += part.duration_secs();
            prev = Some(slot);
        }

        if let Some(head) = chain.head_mut() {
            let play_start = if head.is_live() {
                chrono::Utc::now().timestamp() + LIVE_EDGE_BUFFER_SECS
            } else {
                seek_secs as i64 - head.start_offset() as i64
            };
            head.play_start = Some(play_start);
        }

        if let Some(head) = chain.head() {
            tracing::info!(
                item = item.key(),
                parts = chain.iter().count(),
                head_part = head.part_index(),
                start_offset = head.start_offset(),
                play_start = head.play_start,
                transcoded = head.is_transcoded(),
                "Constructed playback chain"
            );
        }

        Ok(chain)
    }

    /// Fields shared by every part of the item.
    fn item_info(&self, media: &Media, server: Option<&dyn Server>) -> PartInfo {
        let resolution = media.vertical_resolution();
        let hd = resolution >= 480 && self.capabilities.global_flag(GLOBAL_IS_HD);

        let mut info = PartInfo {
            duration_ms: media.duration_ms(),
            full_hd: resolution >= 1080,
            stream_qualities: vec![if hd { StreamQuality::Hd } else { StreamQuality::Sd }],
            frame_rate: media.frame_rate(),
            ..PartInfo::default()
        };

        let subtitle = self.choice.subtitle_stream.as_ref();
        match self.choice.subtitle_decision {
            SubtitleDecision::SoftSideload => {
                let key = subtitle.and_then(|s| s.key.as_deref());
                info.subtitle_url = match (server, key) {
                    (Some(server), Some(key)) => Some(server.build_url(key, true)),
                    _ => {
                        tracing::warn!("Side-loaded subtitle has no server or path; skipping");
                        None
                    }
                };
            }
            SubtitleDecision::SoftContainer => {
                info.subtitle_config = subtitle.map(|s| SubtitleConfig::mkv_track(s.index + 1));
            }
            SubtitleDecision::Burn | SubtitleDecision::None => {}
        }

        info
    }
}

impl std::fmt::Debug for PlaybackPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackPlanner")
            .field("item", &self.item.key())
            .field("choice", &self.choice)
            .field("chain", &self.chain)
            .finish()
    }
}
