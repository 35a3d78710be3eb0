use bevy::prelude::*;
use serde::Serialize;

use super::pacing::{FramePacer, PacingDecision, PacingSettings};
use super::sampler::{ScreenSizeSample, ScreenSizeSampler};
use super::tier::{LodSettings, LodTier, TierProfile};
use super::transition::LodTransition;
use crate::engine::camera::CameraProjection;
use crate::engine::geometry::{DoubleBuffer, EdgeGeometry, NodeGeometry};

/// Identifies one scheduled pass. A token is only honoured while it is the
/// controller's pending token and its generation matches the bound geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassToken {
    generation: u64,
    sequence: u64,
}

impl PassToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Whatever drives frames: asked to run the pass for `token` on the next
/// display refresh.
pub trait FrameCallbackHost {
    fn request_frame(&mut self, token: PassToken);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Scheduled(PassToken),
    /// A pass is already scheduled and has not run yet.
    Busy,
    TooSoon,
    CoolingDown,
    /// No node geometry bound.
    Unbound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassOutcome {
    Stale,
    Unbound,
    NoCamera,
    /// Every sample was behind the camera.
    NoSamples,
    Steady(LodTier),
    Transitioning { target: LodTier, blend: f32 },
    Completed(LodTier),
}

/// Serializable view of the controller for diagnostics and the RPC bridge.
#[derive(Debug, Clone, Serialize)]
pub struct LodSnapshot {
    pub current: LodTier,
    pub target: LodTier,
    pub is_transitioning: bool,
    pub cooling_down: bool,
    pub blend: Option<f32>,
    pub average_px: Option<f32>,
    pub samples_used: usize,
    pub size_multiplier: f32,
    pub edge_detail: f32,
    pub node_buffer: usize,
    pub edge_buffer: usize,
    pub rendered_segments: usize,
}

/// Adapts node sizes and edge segment density to the average on-screen node
/// footprint.
///
/// `update` is the per-frame entry point and only schedules; the measurement
/// and buffer rewrite run in `synchronized_update` when the host calls back
/// with the token. Sampling, classification, buffer writes and the swap
/// happen in that order inside one call.
#[derive(Resource)]
pub struct LodController {
    settings: LodSettings,
    pacer: FramePacer,
    current: LodTier,
    target: LodTier,
    transition: Option<LodTransition>,
    applied: TierProfile,
    is_updating: bool,
    pending: Option<PassToken>,
    generation: u64,
    next_sequence: u64,
    last_sample: Option<ScreenSizeSample>,
    sampler: Option<ScreenSizeSampler>,
    base_sizes: Option<Vec<f32>>,
    full_indices: Option<Vec<u32>>,
    node_sizes: DoubleBuffer<f32>,
    edge_indices: DoubleBuffer<u32>,
}

impl LodController {
    pub fn new(settings: LodSettings, pacing: PacingSettings) -> Self {
        let applied = settings.profile(LodTier::High);
        Self {
            settings,
            pacer: FramePacer::new(pacing),
            current: LodTier::High,
            target: LodTier::High,
            transition: None,
            applied,
            is_updating: false,
            pending: None,
            generation: 0,
            next_sequence: 0,
            last_sample: None,
            sampler: None,
            base_sizes: None,
            full_indices: None,
            node_sizes: DoubleBuffer::new(Vec::new()),
            edge_indices: DoubleBuffer::new(Vec::new()),
        }
    }

    /// Bind node geometry. Any pending pass becomes stale and a running
    /// transition is dropped; sizes are written for the current tier.
    pub fn set_nodes(&mut self, nodes: &NodeGeometry) {
        self.invalidate_pending();
        self.settle();
        self.sampler = Some(ScreenSizeSampler::from_nodes(nodes, &self.settings));
        let base_sizes = nodes.base_sizes().to_vec();
        let sizes = scaled_sizes(&base_sizes, self.applied.size_multiplier);
        self.node_sizes = DoubleBuffer::new(sizes);
        self.base_sizes = Some(base_sizes);
        info!(
            "LOD bound {} nodes ({} samples) at tier {}",
            nodes.len(),
            self.sampler.as_ref().map_or(0, ScreenSizeSampler::len),
            self.current.as_str()
        );
    }

    /// Bind edge geometry, keeping its full detail segment list as the source
    /// for every subsampled index buffer.
    pub fn set_edges(&mut self, edges: &EdgeGeometry) {
        self.invalidate_pending();
        self.settle();
        let full = edges.segment_indices().to_vec();
        self.edge_indices = DoubleBuffer::new(subsample_segments(&full, self.applied.segment_stride()));
        self.full_indices = Some(full);
        debug!("LOD bound {} edge segments", edges.segment_indices().len() / 2);
    }

    /// Replace tunables. Sampling strategy and sample target take effect at
    /// the next `set_nodes`.
    pub fn set_settings(&mut self, settings: LodSettings, pacing: PacingSettings) {
        self.invalidate_pending();
        self.settings = settings;
        self.pacer = FramePacer::new(pacing);
    }

    /// Forget the pending token; its callback will report `Stale`.
    pub fn invalidate_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("LOD pending pass invalidated");
        }
        self.generation += 1;
        self.is_updating = false;
    }

    fn settle(&mut self) {
        self.transition = None;
        self.target = self.current;
        self.applied = self.settings.profile(self.current);
    }

    pub fn is_bound(&self) -> bool {
        self.sampler.is_some()
    }

    /// Per-frame tick. Schedules at most one pass through `host`.
    pub fn update(&mut self, now: f64, frame_delta_secs: f32, host: &mut impl FrameCallbackHost) -> UpdateOutcome {
        self.pacer.record_frame(frame_delta_secs);

        if !self.is_bound() {
            return UpdateOutcome::Unbound;
        }
        if self.is_updating {
            return UpdateOutcome::Busy;
        }
        match self.pacer.check(now, self.transition.is_some()) {
            PacingDecision::TooSoon => return UpdateOutcome::TooSoon,
            PacingDecision::CoolingDown => return UpdateOutcome::CoolingDown,
            PacingDecision::Ready => {}
        }

        let token = PassToken {
            generation: self.generation,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.pending = Some(token);
        self.is_updating = true;
        self.pacer.mark_pass(now);
        host.request_frame(token);
        UpdateOutcome::Scheduled(token)
    }

    /// The scheduled pass: sample, classify, then start, retarget or advance
    /// a transition and publish the blended buffers.
    pub fn synchronized_update(
        &mut self,
        token: PassToken,
        now: f64,
        projection: Option<&CameraProjection>,
    ) -> PassOutcome {
        if self.pending != Some(token) || token.generation != self.generation {
            debug!("LOD pass {} skipped: stale token", token.sequence);
            return PassOutcome::Stale;
        }
        let outcome = self.run_pass(now, projection);
        self.pending = None;
        self.is_updating = false;
        outcome
    }

    fn run_pass(&mut self, now: f64, projection: Option<&CameraProjection>) -> PassOutcome {
        let Some(sampler) = self.sampler.as_ref() else {
            return PassOutcome::Unbound;
        };
        let Some(projection) = projection else {
            warn!("LOD pass skipped: no active camera");
            return PassOutcome::NoCamera;
        };
        let Some(sample) = sampler.measure(projection) else {
            debug!("LOD pass skipped: no samples in front of the camera");
            return PassOutcome::NoSamples;
        };
        self.last_sample = Some(sample);

        let classified = self.settings.classify(sample.average_px, self.current);
        match self.transition {
            None if classified == self.current => return PassOutcome::Steady(self.current),
            None => {
                debug!(
                    "LOD {} -> {} at {:.2}px",
                    self.current.as_str(),
                    classified.as_str(),
                    sample.average_px
                );
                self.begin_transition(self.applied, classified, now);
            }
            Some(transition) if transition.target != classified => {
                debug!(
                    "LOD retarget {} -> {} at {:.2}px",
                    transition.target.as_str(),
                    classified.as_str(),
                    sample.average_px
                );
                self.begin_transition(self.applied, classified, now);
            }
            Some(_) => {}
        }

        let Some(transition) = self.transition else {
            return PassOutcome::Steady(self.current);
        };
        let blend = transition.blend_at(now);
        self.apply_lod(transition.target, blend);

        if transition.is_complete(now) {
            info!("LOD tier {} -> {}", self.current.as_str(), transition.target.as_str());
            self.current = transition.target;
            self.transition = None;
            self.pacer.start_cooldown(now);
            PassOutcome::Completed(self.current)
        } else {
            PassOutcome::Transitioning {
                target: transition.target,
                blend,
            }
        }
    }

    fn begin_transition(&mut self, from: TierProfile, target: LodTier, now: f64) {
        self.target = target;
        self.transition = Some(LodTransition::new(
            from,
            target,
            self.settings.profile(target),
            now,
            self.settings.transition_duration_secs,
        ));
    }

    /// Write the profile blended `blend` of the way toward `target` into the
    /// back buffers, then publish them. Blends from the running transition's
    /// starting profile, or from the current tier when none is running.
    pub fn apply_lod(&mut self, target: LodTier, blend: f32) {
        let from = match self.transition {
            Some(transition) if transition.target == target => transition.from,
            _ => self.settings.profile(self.current),
        };
        let profile = from.lerp(self.settings.profile(target), blend);

        let mut wrote = false;
        if let Some(base_sizes) = &self.base_sizes {
            let back = self.node_sizes.back_mut();
            back.clear();
            back.extend(base_sizes.iter().map(|base| base * profile.size_multiplier));
            wrote = true;
        }
        if let Some(full) = &self.full_indices {
            let back = self.edge_indices.back_mut();
            back.clear();
            back.extend(full.chunks_exact(2).step_by(profile.segment_stride()).flatten());
            wrote = true;
        }
        if !wrote {
            return;
        }
        self.applied = profile;
        self.swap_buffers();
    }

    /// Publish whatever was written to the back buffers.
    pub fn swap_buffers(&mut self) {
        if self.base_sizes.is_some() {
            self.node_sizes.swap();
        }
        if self.full_indices.is_some() {
            self.edge_indices.swap();
        }
    }

    /// Node sizes currently bound to the rendered geometry.
    pub fn node_sizes(&self) -> &[f32] {
        self.node_sizes.front()
    }

    /// Edge index pairs currently bound to the rendered geometry.
    pub fn edge_indices(&self) -> &[u32] {
        self.edge_indices.front()
    }

    pub fn take_node_sizes_dirty(&mut self) -> bool {
        self.node_sizes.take_needs_update()
    }

    pub fn take_edge_indices_dirty(&mut self) -> bool {
        self.edge_indices.take_needs_update()
    }

    pub fn current_tier(&self) -> LodTier {
        self.current
    }

    pub fn target_tier(&self) -> LodTier {
        self.target
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn state(&self, now: f64) -> LodSnapshot {
        LodSnapshot {
            current: self.current,
            target: self.target,
            is_transitioning: self.transition.is_some(),
            cooling_down: self.pacer.is_cooling_down(now),
            blend: self.transition.map(|t| t.blend_at(now)),
            average_px: self.last_sample.map(|s| s.average_px),
            samples_used: self.last_sample.map_or(0, |s| s.samples_used),
            size_multiplier: self.applied.size_multiplier,
            edge_detail: self.applied.edge_detail,
            node_buffer: self.node_sizes.front_index(),
            edge_buffer: self.edge_indices.front_index(),
            rendered_segments: self.edge_indices.front().len() / 2,
        }
    }
}

impl Default for LodController {
    fn default() -> Self {
        Self::new(LodSettings::default(), PacingSettings::default())
    }
}

fn scaled_sizes(base: &[f32], multiplier: f32) -> Vec<f32> {
    base.iter().map(|b| b * multiplier).collect()
}

fn subsample_segments(full: &[u32], stride: usize) -> Vec<u32> {
    full.chunks_exact(2).step_by(stride.max(1)).flatten().copied().collect()
}
