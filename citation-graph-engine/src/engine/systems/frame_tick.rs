use bevy::prelude::*;

use crate::engine::camera::CameraProjection;
use crate::engine::lod::{FrameCallbackHost, LodController, PassOutcome, PassToken};
use crate::rpc::web_rpc::WebRpcInterface;

/// Holds the pass token requested this frame until the next frame starts.
#[derive(Resource, Default, Debug)]
pub struct FrameCallbackQueue {
    queued: Option<PassToken>,
}

impl FrameCallbackQueue {
    pub fn take(&mut self) -> Option<PassToken> {
        self.queued.take()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_none()
    }
}

impl FrameCallbackHost for FrameCallbackQueue {
    fn request_frame(&mut self, token: PassToken) {
        if let Some(previous) = self.queued.replace(token) {
            debug!("LOD pass {} superseded before it ran", previous.sequence());
        }
    }
}

/// Runs in `PreUpdate`: the pass scheduled during the previous frame.
pub fn run_queued_lod_pass(
    mut queue: ResMut<FrameCallbackQueue>,
    mut lod: ResMut<LodController>,
    time: Res<Time>,
    camera: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    rpc_interface: Option<ResMut<WebRpcInterface>>,
) {
    let Some(token) = queue.take() else {
        return;
    };
    let now = time.elapsed_secs_f64();
    let projection = camera
        .single()
        .ok()
        .and_then(|(camera, transform)| CameraProjection::from_camera(camera, transform));

    let outcome = lod.synchronized_update(token, now, projection.as_ref());
    if let (PassOutcome::Completed(_), Some(mut rpc)) = (outcome, rpc_interface) {
        match serde_json::to_value(lod.state(now)) {
            Ok(state) => rpc.send_notification("lod_changed", state),
            Err(e) => error!("Failed to serialise LOD state: {}", e),
        }
    }
}

/// Runs in `Update`: the per-frame LOD tick.
pub fn lod_frame_tick(mut queue: ResMut<FrameCallbackQueue>, mut lod: ResMut<LodController>, time: Res<Time>) {
    lod.update(time.elapsed_secs_f64(), time.delta_secs(), queue.as_mut());
}
