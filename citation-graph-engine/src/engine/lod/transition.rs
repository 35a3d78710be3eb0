use super::tier::{LodTier, TierProfile};

/// A blend from the profile on screen when the transition began toward the
/// profile of `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodTransition {
    pub from: TierProfile,
    pub target: LodTier,
    pub to: TierProfile,
    pub started_at: f64,
    pub duration: f64,
}

impl LodTransition {
    pub fn new(from: TierProfile, target: LodTier, to: TierProfile, started_at: f64, duration: f64) -> Self {
        Self {
            from,
            target,
            to,
            started_at,
            duration: duration.max(0.0),
        }
    }

    /// Blend factor in `[0, 1]`. A zero duration completes immediately.
    pub fn blend_at(&self, now: f64) -> f32 {
        if self.duration <= f64::EPSILON {
            return 1.0;
        }
        let t = (now - self.started_at) / self.duration;
        if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 1.0 }
    }

    pub fn is_complete(&self, now: f64) -> bool {
        self.blend_at(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: TierProfile = TierProfile {
        size_multiplier: 0.5,
        edge_detail: 0.2,
    };
    const HIGH: TierProfile = TierProfile {
        size_multiplier: 1.0,
        edge_detail: 1.0,
    };

    #[test]
    fn blend_is_clamped() {
        let transition = LodTransition::new(HIGH, LodTier::Low, LOW, 10.0, 0.5);
        assert_eq!(transition.blend_at(9.0), 0.0);
        assert!((transition.blend_at(10.25) - 0.5).abs() < 1e-6);
        assert_eq!(transition.blend_at(11.0), 1.0);
        assert!(!transition.is_complete(10.25));
        assert!(transition.is_complete(10.5));
    }

    #[test]
    fn zero_duration_completes_at_once() {
        let transition = LodTransition::new(HIGH, LodTier::Low, LOW, 3.0, 0.0);
        assert!(transition.is_complete(3.0));
        assert_eq!(HIGH.lerp(LOW, transition.blend_at(3.0)), LOW);
    }
}
