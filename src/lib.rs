//! Playplan - playback plan builder
//!
//! This library crate exposes the CLI's session loading and output rendering
//! for integration testing. The planner itself lives in `pp-plan`.

pub mod render;
pub mod session;
