use bevy::prelude::*;

/// Snapshot of the active camera taken once per LOD pass: the combined
/// clip-from-world matrix, the camera's world-space right vector and the
/// viewport size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjection {
    clip_from_world: Mat4,
    camera_right: Vec3,
    viewport_size: Vec2,
}

impl CameraProjection {
    pub fn new(clip_from_world: Mat4, camera_right: Vec3, viewport_size: Vec2) -> Self {
        Self {
            clip_from_world,
            camera_right: camera_right.normalize_or(Vec3::X),
            viewport_size,
        }
    }

    /// Build from a Bevy camera. `None` until the camera has a viewport.
    pub fn from_camera(camera: &Camera, transform: &GlobalTransform) -> Option<Self> {
        let viewport_size = camera.logical_viewport_size()?;
        let clip_from_world = camera.clip_from_view() * transform.compute_matrix().inverse();
        Some(Self::new(clip_from_world, transform.right().as_vec3(), viewport_size))
    }

    /// Right-handed perspective camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, viewport_size: Vec2) -> Self {
        let view_from_world = Mat4::look_at_rh(eye, target, Vec3::Y);
        let aspect = viewport_size.x / viewport_size.y.max(1.0);
        let clip_from_view = Mat4::perspective_rh(fov_y_radians, aspect, 0.01, 1.0e6);
        let camera_right = view_from_world.inverse().x_axis.truncate();
        Self::new(clip_from_view * view_from_world, camera_right, viewport_size)
    }

    pub fn camera_right(&self) -> Vec3 {
        self.camera_right
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    /// Viewport pixel coordinates (origin top-left). `None` for points at or
    /// behind the camera plane.
    pub fn world_to_viewport(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.clip_from_world * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.is_finite() {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport_size.x,
            (1.0 - ndc.y) * 0.5 * self.viewport_size.y,
        ))
    }

    /// On-screen extent of a world-space length placed at `world`,
    /// perpendicular to the view direction.
    pub fn projected_size(&self, world: Vec3, world_size: f32) -> Option<f32> {
        let centre = self.world_to_viewport(world)?;
        let edge = self.world_to_viewport(world + self.camera_right * world_size)?;
        let size = centre.distance(edge);
        size.is_finite().then_some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> CameraProjection {
        CameraProjection::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, FRAC_PI_2, Vec2::new(800.0, 800.0))
    }

    #[test]
    fn target_projects_to_viewport_centre() {
        let centre = camera().world_to_viewport(Vec3::ZERO).unwrap();
        assert!((centre - Vec2::new(400.0, 400.0)).length() < 1e-3);
    }

    #[test]
    fn points_behind_camera_are_rejected() {
        assert!(camera().world_to_viewport(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn projected_size_falls_with_distance() {
        let camera = camera();
        // 90° fov at distance 10: half-height 10 world units over 400 px.
        let near = camera.projected_size(Vec3::ZERO, 1.0).unwrap();
        assert!((near - 40.0).abs() < 1e-2, "got {near}");
        let far = camera.projected_size(Vec3::new(0.0, 0.0, -10.0), 1.0).unwrap();
        assert!((far - 20.0).abs() < 1e-2, "got {far}");
    }

    #[test]
    fn camera_right_is_world_x_for_default_orientation() {
        assert!((camera().camera_right() - Vec3::X).length() < 1e-5);
    }
}
