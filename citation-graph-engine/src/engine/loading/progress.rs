use bevy::prelude::*;
use serde::Serialize;

#[derive(Resource, Default, Debug, Clone, Serialize)]
pub struct LoadingProgress {
    pub settings_resolved: bool,
    pub dataset_loaded: bool,
    pub geometry_built: bool,
    pub meshes_spawned: bool,
    pub failed: Option<String>,
}

impl LoadingProgress {
    pub fn ready_to_build(&self) -> bool {
        self.settings_resolved && self.dataset_loaded && !self.geometry_built && self.failed.is_none()
    }
}
