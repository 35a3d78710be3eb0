use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use constants::render_settings::FPS_NOTIFICATION_INTERVAL_SECS;

use crate::engine::core::app_state::OverlayText;
use crate::engine::lod::LodController;
use crate::engine::visibility::VisibilityEngine;
use crate::rpc::web_rpc::WebRpcInterface;

pub fn smoothed_fps(diagnostics: &DiagnosticsStore) -> Option<f64> {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
}

pub fn fps_notification_system(
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();
    if current_time - *last_send_time < FPS_NOTIFICATION_INTERVAL_SECS {
        return;
    }
    if let Some(value) = smoothed_fps(&diagnostics) {
        rpc_interface.send_notification("fps_update", serde_json::json!({ "fps": value as f32 }));
        *last_send_time = current_time;
    }
}

/// Native overlay: frame rate, LOD tier and visible counts. Counts come from
/// the engine's cached stats; nothing here scans the graph.
pub fn overlay_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    visibility: Res<VisibilityEngine>,
    lod: Res<LodController>,
    mut query: Query<&mut Text, With<OverlayText>>,
) {
    let fps = smoothed_fps(&diagnostics).unwrap_or(0.0);
    let stats = visibility.latest_stats();
    for mut text in &mut query {
        text.0 = format!(
            "FPS: {fps:.1}\nLOD: {}{}\nNodes: {}/{}  Edges: {}/{}",
            lod.current_tier().as_str(),
            if lod.is_transitioning() {
                format!(" -> {}", lod.target_tier().as_str())
            } else {
                String::new()
            },
            stats.visible_nodes,
            stats.total_nodes,
            stats.visible_edges,
            stats.total_edges,
        );
    }
}
