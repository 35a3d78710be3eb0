//! Camera access for the LOD sampler and scene navigation for the viewer.

/// World to viewport projection snapshot consumed by the LOD sampler.
pub mod projection;

/// Fly camera resource and controller system for graph navigation.
pub mod viewport_camera;

pub use projection::CameraProjection;
pub use viewport_camera::{ViewportCamera, camera_controller};
