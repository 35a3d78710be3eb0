/// Node point size in world units before centrality scaling.
pub const BASE_NODE_SIZE: f32 = 1.0;

/// Extra size per unit of (normalised) centrality.
pub const CENTRALITY_SIZE_SCALE: f32 = 2.0;

/// Line segments per curved edge polyline.
pub const EDGE_CURVE_SEGMENTS: u32 = 8;

/// Height of the curve's control point, as a fraction of edge length.
pub const EDGE_CURVE_LIFT: f32 = 0.15;

/// Edge colour darkening applied to the source cluster colour.
pub const EDGE_COLOUR_FACTOR: f32 = 0.6;

/// Interval between FPS notifications sent to the page (seconds).
pub const FPS_NOTIFICATION_INTERVAL_SECS: f32 = 0.5;
