use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::geometry::GeometrySettings;
use crate::engine::lod::{LodSettings, PacingSettings};
use crate::engine::visibility::VisibilitySettings;

/// Every runtime tunable, loaded from `*.settings.json`. Missing fields and a
/// missing file both fall back to the defaults in the `constants` crate.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub lod: LodSettings,
    pub pacing: PacingSettings,
    pub visibility: VisibilitySettings,
    pub geometry: GeometrySettings,
}
