use constants::lod::{
    HIGH_TIER_MIN_PX, HYSTERESIS_FRACTION, MEDIUM_TIER_MIN_PX, SAMPLE_TARGET, SPATIAL_GRID_RESOLUTION,
    TIER_EDGE_DETAIL, TIER_SIZE_MULTIPLIERS, TRANSITION_DURATION_SECS,
};
use serde::{Deserialize, Serialize};

use super::sampler::SampleStrategy;

/// Discrete detail level. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LodTier {
    Low,
    Medium,
    High,
}

impl LodTier {
    pub const ALL: [LodTier; 3] = [LodTier::Low, LodTier::Medium, LodTier::High];

    pub fn index(self) -> usize {
        match self {
            LodTier::Low => 0,
            LodTier::Medium => 1,
            LodTier::High => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LodTier::Low => "low",
            LodTier::Medium => "medium",
            LodTier::High => "high",
        }
    }
}

/// What a tier renders: node size multiplier and fraction of edge segments
/// retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    pub size_multiplier: f32,
    pub edge_detail: f32,
}

impl TierProfile {
    /// Linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: TierProfile, t: f32) -> TierProfile {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        if t >= 1.0 {
            return other;
        }
        TierProfile {
            size_multiplier: self.size_multiplier + (other.size_multiplier - self.size_multiplier) * t,
            edge_detail: self.edge_detail + (other.edge_detail - self.edge_detail) * t,
        }
    }

    /// Keep one segment in every `k`: detail 0.2 keeps one in five.
    pub fn segment_stride(self) -> usize {
        let detail = if self.edge_detail.is_finite() {
            self.edge_detail.clamp(0.01, 1.0)
        } else {
            1.0
        };
        ((1.0 / detail).round() as usize).max(1)
    }
}

/// LOD tunables. Thresholds are average projected node sizes in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodSettings {
    pub high_min_px: f32,
    pub medium_min_px: f32,
    pub hysteresis: f32,
    pub low: TierProfile,
    pub medium: TierProfile,
    pub high: TierProfile,
    pub transition_duration_secs: f64,
    pub sample_target: usize,
    pub sampling: SampleStrategy,
    pub grid_resolution: u32,
}

impl Default for LodSettings {
    fn default() -> Self {
        let profile = |i: usize| TierProfile {
            size_multiplier: TIER_SIZE_MULTIPLIERS[i],
            edge_detail: TIER_EDGE_DETAIL[i],
        };
        Self {
            high_min_px: HIGH_TIER_MIN_PX,
            medium_min_px: MEDIUM_TIER_MIN_PX,
            hysteresis: HYSTERESIS_FRACTION,
            low: profile(0),
            medium: profile(1),
            high: profile(2),
            transition_duration_secs: TRANSITION_DURATION_SECS,
            sample_target: SAMPLE_TARGET,
            sampling: SampleStrategy::Stride,
            grid_resolution: SPATIAL_GRID_RESOLUTION,
        }
    }
}

impl LodSettings {
    pub fn profile(&self, tier: LodTier) -> TierProfile {
        match tier {
            LodTier::Low => self.low,
            LodTier::Medium => self.medium,
            LodTier::High => self.high,
        }
    }

    /// Classify an average projected size given the tier currently shown.
    ///
    /// The measurement is biased toward the current tier: inflated while
    /// high, deflated while low. Note the direction. Shrinking the value while
    /// high would push it out of the tier it is in and make a value near a
    /// threshold flap; inflating it means leaving `High` takes a size below
    /// `high_min_px / (1 + hysteresis)`, and leaving `Low` takes one above
    /// `medium_min_px / (1 - hysteresis)`. For a fixed current tier the
    /// mapping is monotonic in `size_px`.
    pub fn classify(&self, size_px: f32, current: LodTier) -> LodTier {
        let hysteresis = self.hysteresis.clamp(0.0, 0.9);
        let bias = match current {
            LodTier::High => 1.0 + hysteresis,
            LodTier::Medium => 1.0,
            LodTier::Low => 1.0 - hysteresis,
        };
        self.classify_raw(size_px * bias)
    }

    /// Threshold mapping with no hysteresis.
    pub fn classify_raw(&self, size_px: f32) -> LodTier {
        if size_px > self.high_min_px {
            LodTier::High
        } else if size_px > self.medium_min_px {
            LodTier::Medium
        } else {
            LodTier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_thresholds() {
        let settings = LodSettings::default();
        assert_eq!(settings.classify_raw(5.01), LodTier::High);
        assert_eq!(settings.classify_raw(5.0), LodTier::Medium);
        assert_eq!(settings.classify_raw(2.01), LodTier::Medium);
        assert_eq!(settings.classify_raw(2.0), LodTier::Low);
    }

    #[test]
    fn hysteresis_holds_current_tier_near_threshold() {
        let settings = LodSettings::default();
        // Just under the high threshold keeps high, but not medium.
        assert_eq!(settings.classify(4.8, LodTier::High), LodTier::High);
        assert_eq!(settings.classify(4.8, LodTier::Medium), LodTier::Medium);
        // Just over the medium threshold keeps low.
        assert_eq!(settings.classify(2.1, LodTier::Low), LodTier::Low);
        assert_eq!(settings.classify(2.1, LodTier::Medium), LodTier::Medium);
        // Far from a threshold hysteresis changes nothing.
        assert_eq!(settings.classify(0.5, LodTier::High), LodTier::Low);
        assert_eq!(settings.classify(50.0, LodTier::Low), LodTier::High);
    }

    #[test]
    fn lerp_clamps_blend() {
        let settings = LodSettings::default();
        let (low, high) = (settings.low, settings.high);
        assert_eq!(low.lerp(high, -1.0), low);
        assert_eq!(low.lerp(high, 2.0), high);
        let mid = low.lerp(high, 0.5);
        assert!((mid.size_multiplier - 0.75).abs() < 1e-6);
        assert!((mid.edge_detail - 0.6).abs() < 1e-6);
    }

    #[test]
    fn segment_stride_from_detail() {
        let stride = |edge_detail| {
            TierProfile {
                size_multiplier: 1.0,
                edge_detail,
            }
            .segment_stride()
        };
        assert_eq!(stride(1.0), 1);
        assert_eq!(stride(0.5), 2);
        assert_eq!(stride(0.2), 5);
        assert_eq!(stride(0.0), 100);
        assert_eq!(stride(f32::NAN), 1);
    }

    #[test]
    fn tiers_order_low_to_high() {
        assert!(LodTier::Low < LodTier::Medium && LodTier::Medium < LodTier::High);
        assert_eq!(LodTier::ALL.map(LodTier::index), [0, 1, 2]);
    }
}
