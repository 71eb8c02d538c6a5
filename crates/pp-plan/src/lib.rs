//! pp-plan: the playback plan builder.
//!
//! Given a selected media item, the planner decides per part whether to
//! stream the source file directly or ask the server to transcode it, builds
//! the concrete request for each part, and stitches the results into a
//! [`PartChain`] the player consumes one part at a time.
//!
//! # Modules
//!
//! - [`request`] - Transcode request builder primitive (base URL, params, profile extras)
//! - [`descriptor`] - [`PlaybackDescriptor`], the unit handed to the player
//! - [`direct`] - Direct play URL construction
//! - [`transcode`] - HLS and Matroska transcode request construction
//! - [`chain`] - Arena-backed part chain with forward/backward links
//! - [`planner`] - [`PlaybackPlanner`]: part chain assembly and navigation
//! - [`memory`] - In-memory collaborators for fixtures, tools, and tests
//!
//! All operations are synchronous and perform no network I/O.

pub mod chain;
pub mod descriptor;
pub mod direct;
pub mod memory;
pub mod planner;
pub mod request;
pub mod transcode;

mod context;

// Re-export commonly used items at the crate root.
pub use chain::PartChain;
pub use descriptor::{
    DirectStream, PartInfo, PartStream, PlaybackDescriptor, SubtitleConfig, SwitchingStrategy,
    TranscodeStream,
};
pub use planner::{PlanRequest, PlaybackPlanner};
pub use request::TranscodeRequest;
pub use transcode::TranscodeVariant;
