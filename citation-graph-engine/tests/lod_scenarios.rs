//! LOD controller scenarios driven with a synthetic camera and clock.

mod support;

use std::f32::consts::FRAC_PI_2;

use bevy::math::{Vec2, Vec3};
use citation_graph_engine::engine::camera::CameraProjection;
use citation_graph_engine::engine::geometry::{GeometrySettings, GraphBuilder, GraphDataset, GraphGeometry};
use citation_graph_engine::engine::lod::{
    FrameCallbackHost, LodController, LodSettings, LodTier, PacingSettings, PassOutcome, PassToken,
    ScreenSizeSampler, UpdateOutcome,
};
use support::graphs::{edge, node};

#[derive(Default)]
struct Frames(Vec<PassToken>);

impl FrameCallbackHost for Frames {
    fn request_frame(&mut self, token: PassToken) {
        self.0.push(token);
    }
}

/// Ten unit nodes near the origin in the z = 0 plane and one edge drawn
/// with 20 segments.
fn graph() -> GraphGeometry {
    let dataset = GraphDataset {
        nodes: (0..10)
            .map(|i| node(i, Some(0), Some(2000.0), [i as f64 * 0.1, 0.0, 0.0]))
            .collect(),
        edges: vec![edge(0, 9, None)],
    };
    let settings = GeometrySettings {
        edge_curve_segments: 20,
        ..Default::default()
    };
    GraphBuilder::new(&settings).build(&dataset).unwrap()
}

/// With a 90° field of view over 800 px, a unit node at `distance` spans
/// `400 / distance` px.
fn camera_at(distance: f32) -> CameraProjection {
    CameraProjection::look_at(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, FRAC_PI_2, Vec2::splat(800.0))
}

fn bound_controller(settings: LodSettings, geometry: &GraphGeometry) -> LodController {
    let mut controller = LodController::new(settings, PacingSettings::default());
    controller.set_nodes(geometry.nodes.as_ref().unwrap());
    controller.set_edges(geometry.edges.as_ref().unwrap());
    controller
}

fn pass(controller: &mut LodController, now: f64, camera: &CameraProjection) -> PassOutcome {
    let mut frames = Frames::default();
    match controller.update(now, 1.0 / 60.0, &mut frames) {
        UpdateOutcome::Scheduled(token) => {
            assert_eq!(frames.0, vec![token]);
            controller.synchronized_update(token, now, Some(camera))
        }
        other => panic!("pass at {now} not scheduled: {other:?}"),
    }
}

/// Sizes are one uniform multiple of the base sizes and every index pair is
/// an original consecutive segment.
fn assert_consistent(controller: &LodController, geometry: &GraphGeometry) -> f32 {
    let base = geometry.nodes.as_ref().unwrap().base_sizes();
    let sizes = controller.node_sizes();
    assert_eq!(sizes.len(), base.len());
    let multiplier = sizes[0] / base[0];
    for (size, base) in sizes.iter().zip(base) {
        assert!((size / base - multiplier).abs() < 1e-5);
    }

    let indices = controller.edge_indices();
    assert_eq!(indices.len() % 2, 0);
    for pair in indices.chunks_exact(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
    multiplier
}

#[test]
fn sampled_size_crosses_thresholds_where_configured() {
    let geometry = graph();
    let settings = LodSettings::default();
    let sampler = ScreenSizeSampler::from_nodes(geometry.nodes.as_ref().unwrap(), &settings);

    let cases = [
        (40.0, LodTier::High),
        (79.0, LodTier::High),
        (81.0, LodTier::Medium),
        (199.0, LodTier::Medium),
        (201.0, LodTier::Low),
        (400.0, LodTier::Low),
    ];
    for (distance, expected) in cases {
        let sample = sampler.measure(&camera_at(distance)).unwrap();
        let expected_px = 400.0 / distance;
        assert!(
            (sample.average_px - expected_px).abs() < expected_px * 1e-3,
            "{distance}: {} px",
            sample.average_px
        );
        assert_eq!(settings.classify_raw(sample.average_px), expected, "distance {distance}");
    }
}

#[test]
fn zooming_out_and_back_walks_the_tiers() {
    let geometry = graph();
    let settings = LodSettings {
        transition_duration_secs: 0.0,
        ..Default::default()
    };
    let mut controller = bound_controller(settings, &geometry);
    assert_eq!(controller.edge_indices().len(), 40);

    assert_eq!(pass(&mut controller, 0.0, &camera_at(300.0)), PassOutcome::Completed(LodTier::Low));
    assert!((assert_consistent(&controller, &geometry) - 0.5).abs() < 1e-5);
    assert_eq!(controller.edge_indices().len(), 8);

    assert_eq!(pass(&mut controller, 1.0, &camera_at(120.0)), PassOutcome::Completed(LodTier::Medium));
    assert_eq!(controller.edge_indices().len(), 20);

    assert_eq!(pass(&mut controller, 2.0, &camera_at(40.0)), PassOutcome::Completed(LodTier::High));
    assert!((assert_consistent(&controller, &geometry) - 1.0).abs() < 1e-5);
    assert_eq!(controller.edge_indices().len(), 40);
}

#[test]
fn hysteresis_holds_the_current_tier_near_a_threshold() {
    let geometry = graph();
    let mut controller = bound_controller(LodSettings::default(), &geometry);

    // 4.9 px is below the 5 px threshold but within 10% of it.
    assert_eq!(
        pass(&mut controller, 0.0, &camera_at(400.0 / 4.9)),
        PassOutcome::Steady(LodTier::High)
    );
}

#[test]
fn blended_buffers_stay_consistent_through_a_transition() {
    let geometry = graph();
    let mut controller = bound_controller(LodSettings::default(), &geometry);
    let far = camera_at(300.0);

    let mut multipliers = Vec::new();
    for step in 0..3 {
        let now = step as f64 * 0.12;
        match pass(&mut controller, now, &far) {
            PassOutcome::Transitioning { target, .. } => assert_eq!(target, LodTier::Low),
            other => panic!("step {step}: {other:?}"),
        }
        assert!(controller.is_transitioning());
        multipliers.push(assert_consistent(&controller, &geometry));
    }
    assert_eq!(pass(&mut controller, 0.36, &far), PassOutcome::Completed(LodTier::Low));
    multipliers.push(assert_consistent(&controller, &geometry));

    assert!(multipliers.windows(2).all(|w| w[1] <= w[0]));
    assert!((multipliers[3] - 0.5).abs() < 1e-5);
    assert_eq!(controller.current_tier(), LodTier::Low);
}

#[test]
fn rebinding_geometry_makes_the_pending_pass_stale() {
    let geometry = graph();
    let mut controller = bound_controller(LodSettings::default(), &geometry);
    let before = controller.node_sizes().to_vec();

    let mut frames = Frames::default();
    let UpdateOutcome::Scheduled(stale) = controller.update(0.0, 1.0 / 60.0, &mut frames) else {
        panic!("first pass not scheduled");
    };
    assert_eq!(controller.update(0.5, 1.0 / 60.0, &mut frames), UpdateOutcome::Busy);

    controller.set_nodes(geometry.nodes.as_ref().unwrap());
    assert_eq!(
        controller.synchronized_update(stale, 0.5, Some(&camera_at(300.0))),
        PassOutcome::Stale
    );
    assert_eq!(controller.node_sizes(), before.as_slice());
    assert_eq!(controller.current_tier(), LodTier::High);

    let UpdateOutcome::Scheduled(fresh) = controller.update(1.0, 1.0 / 60.0, &mut frames) else {
        panic!("fresh pass not scheduled");
    };
    assert!(fresh.generation() > stale.generation());
    assert_eq!(frames.0.len(), 2);
}
