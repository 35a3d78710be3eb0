use bevy::color::Color;

/// Colour used for nodes whose cluster has no palette entry.
pub const UNCLUSTERED_COLOUR: Color = Color::srgb(0.55, 0.55, 0.55);

/// Topic cluster palette, assigned by `cluster_id % CLUSTER_PALETTE.len()`.
pub const CLUSTER_PALETTE: &[Color] = &[
    Color::srgb(0.122, 0.467, 0.706),
    Color::srgb(1.0, 0.498, 0.055),
    Color::srgb(0.173, 0.627, 0.173),
    Color::srgb(0.839, 0.153, 0.157),
    Color::srgb(0.580, 0.404, 0.741),
    Color::srgb(0.549, 0.337, 0.294),
    Color::srgb(0.890, 0.467, 0.761),
    Color::srgb(0.737, 0.741, 0.133),
    Color::srgb(0.090, 0.745, 0.812),
];

/// Palette colour for a cluster id.
pub fn cluster_colour(cluster_id: Option<u32>) -> Color {
    cluster_id
        .map(|id| CLUSTER_PALETTE[id as usize % CLUSTER_PALETTE.len()])
        .unwrap_or(UNCLUSTERED_COLOUR)
}
