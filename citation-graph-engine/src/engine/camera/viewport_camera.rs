use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;

const YAW_SENSITIVITY: f32 = 0.0035;
const PITCH_SENSITIVITY: f32 = 0.0030;
const PITCH_LIMIT: f32 = 1.55;

/// Fly camera state. The transform eases toward `position` and the yaw/pitch
/// rotation every frame so the graph never jumps under the LOD sampler.
#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    /// Scales dolly and keyboard speed; roughly the size of the graph.
    pub scene_extent: f32,
}

impl ViewportCamera {
    /// Frame a bounding box from its +Z side, slightly above centre.
    pub fn with_bounds(min: Vec3, max: Vec3) -> Self {
        let centre = (min + max) * 0.5;
        let extent = (max - min).length().max(1.0);
        let pitch = -0.3_f32;
        let yaw = 0.0;
        let rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
        // Back off along the view direction so the centre sits on screen.
        let position = centre + rotation * Vec3::Z * extent;
        Self {
            position,
            pitch,
            yaw,
            scene_extent: extent,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn look(&mut self, mouse_delta: Vec2) {
        self.yaw -= mouse_delta.x * YAW_SENSITIVITY;
        self.pitch = (self.pitch - mouse_delta.y * PITCH_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the view direction; positive scroll moves forward.
    pub fn dolly(&mut self, scroll: f32) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        let speed = (self.scene_extent * 0.05).clamp(0.5, 500.0);
        let forward = self.rotation() * Vec3::Z;
        self.position -= forward * (scroll * speed);
    }

    /// `input` is camera-relative: x right, y world up, z backward.
    pub fn fly(&mut self, input: Vec3, speed_scale: f32, dt: f32) {
        if input == Vec3::ZERO {
            return;
        }
        let rotation = self.rotation();
        let world_delta = rotation * Vec3::X * input.x + Vec3::Y * input.y + rotation * Vec3::Z * input.z;
        let speed = (self.scene_extent * 0.25).clamp(2.0, 2000.0) * speed_scale;
        self.position += world_delta.normalize_or_zero() * speed * dt;
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 100.0),
            pitch: 0.0,
            yaw: 0.0,
            scene_extent: 100.0,
        }
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        viewport_camera.look(mouse_delta);
    }

    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    viewport_camera.dolly(scroll);

    let mut input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) { input.z -= 1.0; }
    if keyboard.pressed(KeyCode::KeyS) { input.z += 1.0; }
    if keyboard.pressed(KeyCode::KeyD) { input.x += 1.0; }
    if keyboard.pressed(KeyCode::KeyA) { input.x -= 1.0; }
    if keyboard.pressed(KeyCode::KeyE) { input.y += 1.0; }
    if keyboard.pressed(KeyCode::KeyQ) { input.y -= 1.0; }

    // Shift = faster, ctrl = slower
    let mut speed_scale = 1.0;
    if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) { speed_scale *= 3.5; }
    if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) { speed_scale *= 0.25; }
    viewport_camera.fly(input, speed_scale, time.delta_secs());

    let lerp = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(viewport_camera.position, lerp);
    camera_transform.rotation = camera_transform.rotation.slerp(viewport_camera.rotation(), lerp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_framing_looks_at_centre() {
        let camera = ViewportCamera::with_bounds(Vec3::splat(-10.0), Vec3::splat(10.0));
        let forward = camera.rotation() * Vec3::NEG_Z;
        let to_centre = (Vec3::ZERO - camera.position).normalize();
        assert!(forward.dot(to_centre) > 0.999);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = ViewportCamera::default();
        camera.look(Vec2::new(0.0, -10_000.0));
        assert_eq!(camera.pitch, PITCH_LIMIT);
    }

    #[test]
    fn positive_scroll_moves_forward() {
        let mut camera = ViewportCamera::default();
        let before = camera.position.z;
        camera.dolly(1.0);
        assert!(camera.position.z < before);
    }
}
