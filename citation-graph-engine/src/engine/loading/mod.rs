//! Dataset and settings loading, then the one-shot geometry build.
//!
//! Settings resolve first (or fall back to defaults), the dataset is turned
//! into flat buffers, the visibility engine and LOD controller are bound to
//! them, and finally the meshes are spawned.

/// Handles for the settings and dataset assets and the systems polling them.
pub mod dataset_loader;

/// Geometry build, subsystem binding and mesh spawning.
pub mod graph_creator;

/// Loading progress flags driving state transitions.
pub mod progress;
