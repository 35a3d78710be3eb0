//! Runtime systems connecting the core engine to the Bevy frame loop.
//!
//! Filter events, time travel playback, the LOD frame scheduler, GPU buffer
//! sync and FPS reporting.

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to the page via RPC and updates the native overlay.
pub mod fps_tracking;

/// LOD frame scheduler: per-frame tick and the queued pass on the next frame.
pub mod frame_tick;

/// Copies dirty visibility, size and index buffers into the graph meshes.
pub mod mesh_sync;

/// Filter and time travel events applied to the visibility engine.
pub mod visibility_sync;
