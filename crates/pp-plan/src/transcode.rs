//! Transcode request construction.
//!
//! Two profile variants exist:
//!
//! - **HLS**: the server's adaptive manifest is used as-is, with the client
//!   committing to a single rendition (`no-adaptation`).
//! - **MKV**: a Matroska remux over plain HTTP, chosen when the server
//!   advertises it and the user prefers it. Only this variant honours a start
//!   offset; starting an HLS transcode mid-segment is broken on the device.
//!
//! Both variants share the common parameters assembled in
//! [`build_transcode`], and both layer capability-driven profile extras onto
//! the server's own profile.

use pp_core::capabilities::{
    GLOBAL_1080P60, GLOBAL_HEVC, GLOBAL_VP9, PREF_BURN_SUBTITLES, PREF_H264_LEVEL,
    PREF_TRANSCODE_FORMAT,
};
use pp_core::server::FEATURE_MKV_TRANSCODE;
use pp_core::{Capabilities, Error, Result, Server, SubtitleDecision};
use serde::Serialize;
use std::fmt;

use crate::context::PlanContext;
use crate::descriptor::{
    PartInfo, PartStream, PlaybackDescriptor, SubtitleConfig, SwitchingStrategy, TranscodeStream,
};
use crate::request::TranscodeRequest;

/// Offsets at or below this many seconds restart the transcode from zero.
///
/// The device fetches the first segment even when told to start later, and
/// the server 404s that segment for small offsets, which kills playback.
pub const MIN_TRANSCODE_OFFSET_SECS: i64 = 12;

/// Channel count assumed when the selected audio stream does not say.
const DEFAULT_AUDIO_CHANNELS: u32 = 6;

/// Lowest AAC sample rate the adaptive protocol accepts.
const MIN_AAC_SAMPLE_RATE: u32 = 22050;

/// Surround codecs tried for Matroska passthrough, highest priority first.
const SURROUND_CODECS: [&str; 3] = ["ac3", "eac3", "dca"];

/// Track number the transcoder assigns to the subtitle stream in its output.
const MKV_SUBTITLE_TRACK: u32 = 3;

const HLS_START_PATH: &str = "/video/:/transcode/universal/start.m3u8";
const MKV_START_PATH: &str = "/video/:/transcode/universal/start.mkv";

/// Which transcode profile a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeVariant {
    Hls,
    Mkv,
}

impl fmt::Display for TranscodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hls => write!(f, "hls"),
            Self::Mkv => write!(f, "mkv"),
        }
    }
}

/// Pick the variant: MKV when the server can and the user wants it.
pub fn select_variant(server: &dyn Server, capabilities: &dyn Capabilities) -> TranscodeVariant {
    let prefers_mkv =
        capabilities.preference(PREF_TRANSCODE_FORMAT).as_deref() == Some("mkv");
    if server.supports_feature(FEATURE_MKV_TRANSCODE) && prefers_mkv {
        TranscodeVariant::Mkv
    } else {
        TranscodeVariant::Hls
    }
}

/// Seconds into the part at which a Matroska transcode should start.
///
/// `trust_seek` is set when the seek position is known to belong to this part
/// (it is the current part, the only part, or the seek falls inside its
/// window). Anything at or below [`MIN_TRANSCODE_OFFSET_SECS`] becomes zero.
pub fn transcode_offset(seek_secs: u64, part_start: u64, trust_seek: bool) -> i64 {
    if !trust_seek {
        return 0;
    }
    let offset = seek_secs as i64 - part_start as i64;
    if offset <= MIN_TRANSCODE_OFFSET_SECS {
        0
    } else {
        offset
    }
}

fn hls_request(ctx: &PlanContext<'_>, server: &dyn Server) -> TranscodeRequest {
    let mut request = TranscodeRequest::new(server.build_url(HLS_START_PATH, true));
    request.add_param("protocol", "hls");

    if ctx.choice.subtitle_decision == SubtitleDecision::SoftSideload {
        request.add_param("skipSubtitles", "1");
    } else if ctx.choice.has_burned_subtitles {
        if let Some(size) = ctx.capabilities.burned_subtitle_size() {
            request.add_param("subtitleSize", size);
        }
    }

    if ctx.capabilities.supports_audio_stream("ac3", 6) {
        request.push_extra(
            "append-transcode-target-audio-codec(type=videoProfile&context=streaming&protocol=hls&audioCodec=ac3)",
        );
        request.push_extra(
            "add-direct-play-profile(type=videoProfile&container=matroska&videoCodec=*&audioCodec=ac3)",
        );
    }

    request
}

fn mkv_request(ctx: &PlanContext<'_>, server: &dyn Server, info: &mut PartInfo) -> TranscodeRequest {
    let caps = ctx.capabilities;
    let mut request = TranscodeRequest::new(server.build_url(MKV_START_PATH, true));
    request.add_param("protocol", "http");
    request.add_param("copyts", "1");

    info.subtitle_url = None;
    if ctx.choice.subtitle_decision == SubtitleDecision::Burn {
        request.add_param("subtitles", "burn");
        if let Some(size) = caps.burned_subtitle_size() {
            request.add_param("subtitleSize", size);
        }
    } else {
        info.subtitle_config = Some(SubtitleConfig::mkv_track(MKV_SUBTITLE_TRACK));

        // Image formats are the only ones burned, so text may be converted.
        if caps.preference(PREF_BURN_SUBTITLES).as_deref() == Some("image") {
            request.add_param("advancedSubtitles", "text");
        }
        request.add_param("subtitles", "auto");
    }

    let audio = ctx.choice.audio_stream.as_ref();

    if caps.supports_surround_sound() {
        let channels = audio
            .and_then(|a| a.channels)
            .unwrap_or(DEFAULT_AUDIO_CHANNELS);

        for codec in SURROUND_CODECS {
            if !caps.supports_audio_stream(codec, channels) {
                continue;
            }
            request.push_extra(format!(
                "append-transcode-target-audio-codec(type=videoProfile&context=streaming&protocol=http&audioCodec={codec})"
            ));
            request.push_extra(format!(
                "add-direct-play-profile(type=videoProfile&container=matroska&videoCodec=*&audioCodec={codec})"
            ));
            if codec == "dca" {
                request.push_extra(
                    "add-limitation(scope=videoAudioCodec&scopeName=dca&type=upperBound&name=audio.channels&value=6&isRequired=false)",
                );
            }
        }
    }

    let sample_rate = audio.map(|a| a.sampling_rate.unwrap_or(MIN_AAC_SAMPLE_RATE));
    if sample_rate.is_some_and(|rate| rate < MIN_AAC_SAMPLE_RATE) {
        request.push_extra(format!(
            "add-limitation(scope=videoAudioCodec&scopeName=aac&type=lowerBound&name=audio.samplingRate&value={MIN_AAC_SAMPLE_RATE}&isRequired=false)"
        ));
    }

    if caps.global_flag(GLOBAL_HEVC) {
        request.push_extra(
            "append-transcode-target-codec(type=videoProfile&context=streaming&protocol=http&videoCodec=hevc)",
        );
    }
    if caps.global_flag(GLOBAL_VP9) {
        request.push_extra(
            "append-transcode-target-codec(type=videoProfile&context=streaming&protocol=http&videoCodec=vp9)",
        );
    }

    request
}

/// Build a transcode descriptor for the part at `part_index` on `server`.
pub(crate) fn build_transcode(
    ctx: &PlanContext<'_>,
    server: &dyn Server,
    mut info: PartInfo,
    part_index: usize,
    allow_direct_stream: bool,
    is_current_part: bool,
) -> Result<PlaybackDescriptor> {
    let caps = ctx.capabilities;
    let part = ctx
        .media
        .parts
        .get(part_index)
        .ok_or_else(|| Error::part_build(part_index, "part index out of range"))?;

    let variant = select_variant(server, caps);
    let mut request = match variant {
        TranscodeVariant::Mkv => mkv_request(ctx, server, &mut info),
        TranscodeVariant::Hls => hls_request(ctx, server),
    };

    // Items on the relay are only reachable through the transcode server.
    let relayed = ctx.item.server().is_some_and(|s| s.is_relay());
    let path = if relayed {
        server
            .swizzle_url(&ctx.item.absolute_path("key"), false)
            .ok_or_else(|| Error::part_build(part_index, "relay path could not be swizzled"))?
    } else {
        ctx.item.absolute_path("key")
    };
    request.add_param("path", path);

    if variant == TranscodeVariant::Mkv {
        let part_start = info.start_offset;
        let seek = ctx.seek_secs;
        let trust_seek = is_current_part
            || ctx.media.parts.len() <= 1
            || (seek >= part_start && seek <= part_start + part.duration_secs());
        let offset = transcode_offset(seek, part_start, trust_seek);
        request.add_param("offset", offset.to_string());
    }

    request.add_param("session", caps.client_identifier());
    request.add_param("directStream", if allow_direct_stream { "1" } else { "0" });
    request.add_param("directPlay", "0");

    let quality_index = caps.quality_index(ctx.item.quality_type(server));
    let tier = caps.quality_tier(quality_index).ok_or_else(|| {
        Error::part_build(part_index, format!("quality tier {quality_index} is not configured"))
    })?;
    request.add_param("videoQuality", tier.quality.to_string());
    request.add_param("videoResolution", tier.resolution_param());
    request.add_param("maxVideoBitrate", tier.max_bitrate.to_string());

    if let Some(media_index) = ctx.media.media_index {
        request.add_param("mediaIndex", media_index.to_string());
    }
    request.add_param("partIndex", part_index.to_string());

    let level = caps.preference_or(PREF_H264_LEVEL, "auto");
    if level != "auto" {
        request.push_extra(format!(
            "add-limitation(scope=videoCodec&scopeName=h264&type=upperBound&name=video.level&value={level}&isRequired=true)"
        ));
    }

    if !caps.global_flag(GLOBAL_1080P60) && tier.resolution.0 >= 1920 {
        request.push_extra(
            "add-limitation(scope=videoCodec&scopeName=h264&type=upperBound&name=video.frameRate&value=30&isRequired=false)",
        );
    }

    tracing::debug!(
        part_index,
        variant = %variant,
        server = server.name(),
        quality_index,
        extras = request.extras().len(),
        "Built transcode part"
    );

    let (format, switching_strategy) = match variant {
        TranscodeVariant::Hls => ("hls", Some(SwitchingStrategy::NoAdaptation)),
        TranscodeVariant::Mkv => ("mkv", None),
    };
    let stream = TranscodeStream {
        url: request.finish()?,
        format: format.to_string(),
        switching_strategy,
        bitrates: vec![0],
        server: server.name().to_string(),
    };

    Ok(PlaybackDescriptor::new(info, PartStream::Transcode(stream)))
}
