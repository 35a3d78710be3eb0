use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    /// Buffers built and bound; meshes not yet spawned.
    GeometryReady,
    Running,
}

#[derive(Component)]
pub struct OverlayText;

pub fn transition_to_geometry_ready(
    progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if progress.geometry_built {
        info!("→ Transitioning to GeometryReady state");
        next_state.set(AppState::GeometryReady);
    }
}

pub fn transition_to_running(progress: Res<LoadingProgress>, mut next_state: ResMut<NextState<AppState>>) {
    if progress.meshes_spawned {
        info!("→ Graph ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}

/// Report loading progress to the page whenever it changes.
pub fn update_loading_frontend(progress: Res<LoadingProgress>, mut rpc_interface: ResMut<WebRpcInterface>) {
    if !progress.is_changed() {
        return;
    }
    match serde_json::to_value(&*progress) {
        Ok(value) => rpc_interface.send_notification("loading_progress", value),
        Err(e) => error!("Failed to serialise loading progress: {}", e),
    }
}
