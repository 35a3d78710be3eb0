use bevy::prelude::*;
use serde::Serialize;

use super::filters::YearRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    Finished,
}

/// Plays the citation network forward in time by sweeping the upper bound
/// of the year window from `start_year` to `end_year`.
///
/// `tick` only yields a new window when the integer year changes, so the
/// (comparatively expensive) visibility rewrite runs once per year step
/// rather than once per frame.
#[derive(Resource, Debug, Clone)]
pub struct TimeTravel {
    start_year: i32,
    end_year: i32,
    years_per_second: f32,
    cursor: f32,
    state: PlaybackState,
    last_emitted: Option<i32>,
}

impl TimeTravel {
    pub fn new(start_year: i32, end_year: i32, years_per_second: f32) -> Self {
        let (start_year, end_year) = (start_year.min(end_year), start_year.max(end_year));
        Self {
            start_year,
            end_year,
            years_per_second: years_per_second.max(0.0),
            cursor: start_year as f32,
            state: PlaybackState::Stopped,
            last_emitted: None,
        }
    }

    /// Replace the sweep bounds and rewind.
    pub fn configure(&mut self, start_year: i32, end_year: i32) {
        let years_per_second = self.years_per_second;
        *self = Self::new(start_year, end_year, years_per_second);
    }

    pub fn set_speed(&mut self, years_per_second: f32) {
        if years_per_second.is_finite() {
            self.years_per_second = years_per_second.max(0.0);
        }
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Finished {
            self.rewind();
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.rewind();
        self.state = PlaybackState::Stopped;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_year(&self) -> i32 {
        (self.cursor.floor() as i32).clamp(self.start_year, self.end_year)
    }

    /// Advance playback by `delta_secs`. Returns the window to apply when the
    /// visible year changed.
    pub fn tick(&mut self, delta_secs: f32) -> Option<YearRange> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.cursor += delta_secs * self.years_per_second;
        }

        let year = self.current_year();
        if self.cursor >= self.end_year as f32 {
            self.state = PlaybackState::Finished;
            info!("Time travel reached {}", self.end_year);
        }

        if self.last_emitted == Some(year) {
            return None;
        }
        self.last_emitted = Some(year);
        Some(YearRange::new(self.start_year, year))
    }

    fn rewind(&mut self) {
        self.cursor = self.start_year as f32;
        self.last_emitted = None;
    }
}
