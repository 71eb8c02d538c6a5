//! Direct play URL construction.
//!
//! Points the player straight at the part's source file. Nothing here touches
//! the network: URLs and flags come from already-known metadata, and live
//! detection is delegated to the [`pp_core::ManifestProbe`].

use pp_core::{Error, Protocol, Result};

use crate::context::PlanContext;
use crate::descriptor::{DirectStream, PartInfo, PartStream, PlaybackDescriptor, SwitchingStrategy};

/// Container reported when the rendition does not name one.
pub const DEFAULT_CONTAINER: &str = "mp4";

/// Map legacy single-file container aliases onto their canonical name.
pub fn normalize_container(container: Option<&str>) -> String {
    match container.unwrap_or(DEFAULT_CONTAINER) {
        "mov" | "m4v" => DEFAULT_CONTAINER.to_string(),
        other => other.to_string(),
    }
}

/// Build a direct play descriptor for the part at `part_index`.
pub(crate) fn build_direct_play(
    ctx: &PlanContext<'_>,
    mut info: PartInfo,
    part_index: usize,
) -> Result<PlaybackDescriptor> {
    let part = ctx
        .media
        .parts
        .get(part_index)
        .ok_or_else(|| Error::part_build(part_index, "part index out of range"))?;
    let server = ctx
        .item
        .server()
        .ok_or_else(|| Error::NoServer(ctx.item.key().to_string()))?;

    // Only hand out the token when the request actually lands on the server.
    let is_request_to_server = server.is_request_to_server(&server.build_url(&part.key, false));
    let url = server.build_url(&part.key, is_request_to_server);
    let token = if is_request_to_server {
        server.token()
    } else {
        None
    };

    let (format, switching_strategy) = match ctx.media.protocol {
        Protocol::Hls => {
            info.live = ctx.probe.is_live(&url, &ctx.media.indirect_headers);
            ("hls".to_string(), Some(SwitchingStrategy::FullAdaptation))
        }
        Protocol::Progressive => (normalize_container(ctx.media.container.as_deref()), None),
    };

    tracing::debug!(
        part_index,
        format = %format,
        live = info.live,
        is_request_to_server,
        "Built direct play part"
    );

    let stream = DirectStream {
        url,
        format,
        switching_strategy,
        bitrates: vec![ctx.media.bitrate.unwrap_or(0)],
        is_request_to_server,
        token,
        audio_language: ctx
            .choice
            .audio_stream
            .as_ref()
            .and_then(|audio| audio.language_code.clone()),
    };

    Ok(PlaybackDescriptor::new(info, PartStream::Direct(stream)))
}
