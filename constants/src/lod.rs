/// Average projected node size (px) above which the high tier is selected.
pub const HIGH_TIER_MIN_PX: f32 = 5.0;

/// Average projected node size (px) above which the medium tier is selected.
pub const MEDIUM_TIER_MIN_PX: f32 = 2.0;

/// Fraction by which a measured size is biased toward the current tier.
pub const HYSTERESIS_FRACTION: f32 = 0.1;

/// Node size multipliers, indexed low / medium / high.
pub const TIER_SIZE_MULTIPLIERS: [f32; 3] = [0.5, 0.75, 1.0];

/// Fraction of edge segments retained, indexed low / medium / high.
pub const TIER_EDGE_DETAIL: [f32; 3] = [0.2, 0.5, 1.0];

/// Duration of the blend between two tiers (seconds).
pub const TRANSITION_DURATION_SECS: f64 = 0.3;

/// Quiet period after a transition completes (seconds).
pub const TRANSITION_COOLDOWN_SECS: f64 = 0.25;

/// Approximate number of nodes sampled per measurement pass.
pub const SAMPLE_TARGET: usize = 300;

/// Lower bound on the spacing between measurement passes (seconds).
pub const MIN_UPDATE_INTERVAL_SECS: f64 = 0.1;

/// Upper bound on the spacing between measurement passes (seconds).
pub const MAX_UPDATE_INTERVAL_SECS: f64 = 0.5;

/// Spacing between blend steps while a transition is running (seconds).
pub const TRANSITION_STEP_INTERVAL_SECS: f64 = 1.0 / 30.0;

/// Frame time the adaptive interval is normalised against (seconds).
pub const TARGET_FRAME_TIME_SECS: f32 = 1.0 / 60.0;

/// Number of recent frames kept for the rolling frame time average.
pub const FRAME_TIME_WINDOW: usize = 30;

/// Cells per axis of the spatial sampling grid.
pub const SPATIAL_GRID_RESOLUTION: u32 = 16;
