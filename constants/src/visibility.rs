/// Earliest publication year shown before the user narrows the window.
pub const DEFAULT_FROM_YEAR: i32 = 1900;

/// Latest publication year shown before the user narrows the window.
pub const DEFAULT_TO_YEAR: i32 = 2030;

/// Years advanced per second of time travel playback.
pub const TIME_TRAVEL_YEARS_PER_SECOND: f32 = 2.0;
