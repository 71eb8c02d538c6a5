//! pp-core: shared media model, collaborator traits, errors, and configuration.
//!
//! This crate is the foundational dependency for the planner crate, providing
//! the already-deserialized media domain (items, renditions, parts, stream
//! choices), the interfaces the planner consumes (servers, device
//! capabilities, stream decisions, manifest probing), a unified error type,
//! and the JSON device configuration that answers capability queries.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod item;
pub mod media;
pub mod server;

// Re-export the most commonly used items at the crate root.
pub use capabilities::{Capabilities, QualityTier};
pub use config::DeviceConfig;
pub use error::{Error, Result};
pub use item::{AssumeOnDemand, ManifestProbe, MediaItem, StreamDecider};
pub use media::*;
pub use server::Server;
