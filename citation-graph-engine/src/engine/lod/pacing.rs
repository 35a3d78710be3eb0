use std::collections::VecDeque;

use constants::lod::{
    FRAME_TIME_WINDOW, MAX_UPDATE_INTERVAL_SECS, MIN_UPDATE_INTERVAL_SECS, TARGET_FRAME_TIME_SECS,
    TRANSITION_COOLDOWN_SECS, TRANSITION_STEP_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};

/// Pacing tunables for the LOD pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub min_interval_secs: f64,
    pub max_interval_secs: f64,
    pub transition_step_secs: f64,
    pub cooldown_secs: f64,
    pub target_frame_time_secs: f32,
    pub frame_time_window: usize,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            min_interval_secs: MIN_UPDATE_INTERVAL_SECS,
            max_interval_secs: MAX_UPDATE_INTERVAL_SECS,
            transition_step_secs: TRANSITION_STEP_INTERVAL_SECS,
            cooldown_secs: TRANSITION_COOLDOWN_SECS,
            target_frame_time_secs: TARGET_FRAME_TIME_SECS,
            frame_time_window: FRAME_TIME_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingDecision {
    Ready,
    TooSoon,
    CoolingDown,
}

/// Decides when the next LOD pass may run.
///
/// The spacing between measurement passes scales with the rolling average
/// frame time: slow frames push passes further apart, fast frames pull them
/// closer, always within `[min_interval, max_interval]`. While a transition
/// is blending the fixed step interval applies instead.
#[derive(Debug, Clone)]
pub struct FramePacer {
    settings: PacingSettings,
    frame_times: VecDeque<f32>,
    last_pass_at: Option<f64>,
    cooldown_until: f64,
}

impl FramePacer {
    pub fn new(settings: PacingSettings) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(settings.frame_time_window.max(1)),
            settings,
            last_pass_at: None,
            cooldown_until: f64::NEG_INFINITY,
        }
    }

    pub fn settings(&self) -> &PacingSettings {
        &self.settings
    }

    /// Feed one frame duration. Non-positive and non-finite values are
    /// ignored (first frame, paused clocks).
    pub fn record_frame(&mut self, delta_secs: f32) {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }
        if self.frame_times.len() >= self.settings.frame_time_window.max(1) {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta_secs);
    }

    pub fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return self.settings.target_frame_time_secs;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    /// Current minimum spacing between passes.
    pub fn interval(&self, transitioning: bool) -> f64 {
        if transitioning {
            return self.settings.transition_step_secs;
        }
        let target = self.settings.target_frame_time_secs.max(f32::EPSILON) as f64;
        let load = self.average_frame_time() as f64 / target;
        let (min, max) = (
            self.settings.min_interval_secs,
            self.settings.max_interval_secs.max(self.settings.min_interval_secs),
        );
        (min * load).clamp(min, max)
    }

    pub fn check(&self, now: f64, transitioning: bool) -> PacingDecision {
        if !transitioning && now < self.cooldown_until {
            return PacingDecision::CoolingDown;
        }
        match self.last_pass_at {
            Some(last) if now - last < self.interval(transitioning) => PacingDecision::TooSoon,
            _ => PacingDecision::Ready,
        }
    }

    pub fn mark_pass(&mut self, now: f64) {
        self.last_pass_at = Some(now);
    }

    pub fn start_cooldown(&mut self, now: f64) {
        self.cooldown_until = now + self.settings.cooldown_secs;
    }

    pub fn is_cooling_down(&self, now: f64) -> bool {
        now < self.cooldown_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> FramePacer {
        FramePacer::new(PacingSettings {
            min_interval_secs: 0.1,
            max_interval_secs: 0.4,
            transition_step_secs: 0.02,
            cooldown_secs: 0.25,
            target_frame_time_secs: 0.016,
            frame_time_window: 4,
        })
    }

    #[test]
    fn first_pass_is_ready() {
        assert_eq!(pacer().check(0.0, false), PacingDecision::Ready);
    }

    #[test]
    fn interval_grows_with_slow_frames() {
        let mut pacer = pacer();
        assert!((pacer.interval(false) - 0.1).abs() < 1e-9);

        for _ in 0..4 {
            pacer.record_frame(0.032);
        }
        assert!((pacer.interval(false) - 0.2).abs() < 1e-6);

        for _ in 0..4 {
            pacer.record_frame(0.5);
        }
        assert!((pacer.interval(false) - 0.4).abs() < 1e-9, "clamped to max");

        for _ in 0..4 {
            pacer.record_frame(0.004);
        }
        assert!((pacer.interval(false) - 0.1).abs() < 1e-9, "clamped to min");
    }

    #[test]
    fn rolling_window_drops_old_frames() {
        let mut pacer = pacer();
        for dt in [1.0, 1.0, 0.01, 0.01, 0.01, 0.01] {
            pacer.record_frame(dt);
        }
        assert!((pacer.average_frame_time() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn spacing_and_cooldown_gate_passes() {
        let mut pacer = pacer();
        pacer.mark_pass(1.0);
        assert_eq!(pacer.check(1.05, false), PacingDecision::TooSoon);
        assert_eq!(pacer.check(1.05, true), PacingDecision::Ready);
        assert_eq!(pacer.check(1.2, false), PacingDecision::Ready);

        pacer.start_cooldown(1.2);
        assert_eq!(pacer.check(1.3, false), PacingDecision::CoolingDown);
        assert_eq!(pacer.check(1.46, false), PacingDecision::Ready);
    }

    #[test]
    fn ignores_invalid_frame_times() {
        let mut pacer = pacer();
        pacer.record_frame(0.0);
        pacer.record_frame(f32::NAN);
        pacer.record_frame(-1.0);
        assert_eq!(pacer.average_frame_time(), 0.016);
    }
}
