//! Playback descriptors handed to the player, one per part.

use pp_core::StreamQuality;
use serde::Serialize;

/// In-container subtitle track selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleConfig {
    /// Player track selector, e.g. "mkv/3".
    pub track_name: String,
}

impl SubtitleConfig {
    /// Select the Matroska track with the given one-based number.
    pub fn mkv_track(number: u32) -> Self {
        Self {
            track_name: format!("mkv/{number}"),
        }
    }
}

/// Whether the player may switch between renditions of an adaptive stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchingStrategy {
    /// Player performs its own bitrate adaptation.
    FullAdaptation,
    /// Player commits to the single rendition the server offers.
    NoAdaptation,
}

/// Fields common to every descriptor, whichever way the part is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartInfo {
    /// Duration of the whole rendition in milliseconds.
    pub duration_ms: u64,
    pub full_hd: bool,
    pub stream_qualities: Vec<StreamQuality>,
    pub frame_rate: Option<u32>,
    pub subtitle_url: Option<String>,
    pub subtitle_config: Option<SubtitleConfig>,
    pub part_index: usize,
    /// Seconds from the start of the item to the start of this part.
    pub start_offset: u64,
    pub live: bool,
    pub sd_bif_path: Option<String>,
    pub hd_bif_path: Option<String>,
}

/// A part streamed straight from its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectStream {
    pub url: String,
    pub format: String,
    pub switching_strategy: Option<SwitchingStrategy>,
    pub bitrates: Vec<u32>,
    pub is_request_to_server: bool,
    pub token: Option<String>,
    pub audio_language: Option<String>,
}

/// A part produced by a server-side transcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeStream {
    pub url: String,
    pub format: String,
    pub switching_strategy: Option<SwitchingStrategy>,
    pub bitrates: Vec<u32>,
    /// Name of the server performing the transcode.
    pub server: String,
}

/// How a part is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartStream {
    Direct(DirectStream),
    Transcode(TranscodeStream),
}

/// The unit produced for the player.
///
/// Descriptors live in a [`crate::PartChain`] arena; `next` and `previous`
/// are slot indices into that arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackDescriptor {
    #[serde(flatten)]
    pub info: PartInfo,
    pub stream: PartStream,
    /// Seconds into this part at which playback begins. Only the head
    /// descriptor of a freshly built chain carries one.
    pub play_start: Option<i64>,
    #[serde(skip)]
    pub(crate) next: Option<usize>,
    #[serde(skip)]
    pub(crate) previous: Option<usize>,
}

impl PlaybackDescriptor {
    pub(crate) fn new(info: PartInfo, stream: PartStream) -> Self {
        Self {
            info,
            stream,
            play_start: None,
            next: None,
            previous: None,
        }
    }

    pub fn part_index(&self) -> usize {
        self.info.part_index
    }

    pub fn start_offset(&self) -> u64 {
        self.info.start_offset
    }

    pub fn is_live(&self) -> bool {
        self.info.live
    }

    pub fn is_transcoded(&self) -> bool {
        matches!(self.stream, PartStream::Transcode(_))
    }

    /// The stream URLs for this part. Always exactly one.
    pub fn stream_urls(&self) -> Vec<&str> {
        match &self.stream {
            PartStream::Direct(direct) => vec![direct.url.as_str()],
            PartStream::Transcode(transcode) => vec![transcode.url.as_str()],
        }
    }

    pub fn stream_format(&self) -> &str {
        match &self.stream {
            PartStream::Direct(direct) => &direct.format,
            PartStream::Transcode(transcode) => &transcode.format,
        }
    }

    /// Whether the player must present the server token with requests.
    pub fn requires_token(&self) -> bool {
        match &self.stream {
            PartStream::Direct(direct) => direct.token.is_some(),
            PartStream::Transcode(_) => true,
        }
    }

    /// Arena slot of the following part, if linked.
    pub fn next_slot(&self) -> Option<usize> {
        self.next
    }

    /// Arena slot of the part this one was reached from, if any.
    pub fn previous_slot(&self) -> Option<usize> {
        self.previous
    }
}
