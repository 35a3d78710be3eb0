//! Adaptive level of detail for node point sizes and edge segment density.
//!
//! Each eligible frame the controller samples a bounded subset of nodes,
//! projects them to the screen, classifies the average footprint into a
//! tier and blends node sizes and retained edge segments toward that tier.
//! Writes always go to the unbound half of a double buffer and are published
//! by a single swap.

/// The per-frame controller and its scheduling contract.
pub mod controller;

/// Rolling frame times, adaptive update spacing and cooldown.
pub mod pacing;

/// Projected screen size estimation over a sampled node subset.
pub mod sampler;

/// Detail tiers, per-tier profiles and classification with hysteresis.
pub mod tier;

/// Time-bounded blend between two tier profiles.
pub mod transition;

pub use controller::{FrameCallbackHost, LodController, LodSnapshot, PassOutcome, PassToken, UpdateOutcome};
pub use pacing::{FramePacer, PacingDecision, PacingSettings};
pub use sampler::{SampleStrategy, ScreenSizeSample, ScreenSizeSampler};
pub use tier::{LodSettings, LodTier, TierProfile};
pub use transition::LodTransition;
