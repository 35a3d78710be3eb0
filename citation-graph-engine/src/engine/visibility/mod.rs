//! Dual-criteria visibility for nodes and edge vertices.
//!
//! Two independent filters (publication year window, topic cluster
//! selection) each own a float array per node and per edge vertex. The
//! renderer reads a single `visible` attribute, which is always the logical
//! AND of the two.

/// The engine that owns the filter arrays and writes `visible`.
pub mod engine;

/// Year window, cluster selection and their settings.
pub mod filters;

/// Year window playback ("time travel").
pub mod time_travel;

pub use engine::{VisibilityEngine, VisibilityError, VisibilityStats};
pub use filters::{ClusterSelection, EdgeClusterPolicy, VisibilitySettings, YearRange};
pub use time_travel::{PlaybackState, TimeTravel};
