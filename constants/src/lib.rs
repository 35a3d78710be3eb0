//! Shared tunables for the citation graph engine.
//!
//! Values here are defaults only. Runtime overrides come from the engine's
//! settings JSON.

pub mod cluster;
pub mod lod;
pub mod path;
pub mod render_settings;
pub mod visibility;
