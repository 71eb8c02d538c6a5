//! Read-only inputs shared by the per-part builders during one build.

use pp_core::{Capabilities, ManifestProbe, Media, MediaItem, StreamChoice};

/// Everything a part builder may consult, borrowed for one `build` call.
pub(crate) struct PlanContext<'a> {
    pub item: &'a dyn MediaItem,
    pub media: &'a Media,
    pub choice: &'a StreamChoice,
    pub capabilities: &'a dyn Capabilities,
    pub probe: &'a dyn ManifestProbe,
    /// Requested seek position in whole seconds.
    pub seek_secs: u64,
}
