use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::tier::LodSettings;
use crate::engine::camera::CameraProjection;
use crate::engine::geometry::NodeGeometry;
use crate::engine::spatial::SpatialGrid;

/// How the measured subset is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStrategy {
    /// Every `ceil(n / target)`-th node in load order.
    #[default]
    Stride,
    /// Round-robin over occupied grid cells so sparse regions are measured.
    Spatial,
}

/// Average projected node size over one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenSizeSample {
    pub average_px: f32,
    pub samples_used: usize,
}

/// Fixed subset of nodes chosen when geometry is bound. The cost of a
/// measurement depends on `sample_target`, never on the node count.
#[derive(Debug, Clone, Default)]
pub struct ScreenSizeSampler {
    points: Vec<Vec3>,
    sizes: Vec<f32>,
}

impl ScreenSizeSampler {
    pub fn from_nodes(nodes: &NodeGeometry, settings: &LodSettings) -> Self {
        let records = nodes.records();
        let target = settings.sample_target.max(1);

        let indices: Vec<usize> = match settings.sampling {
            SampleStrategy::Stride => {
                let candidates: Vec<usize> = records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.is_well_formed())
                    .map(|(i, _)| i)
                    .collect();
                let step = candidates.len().div_ceil(target).max(1);
                candidates.into_iter().step_by(step).collect()
            }
            SampleStrategy::Spatial => {
                let positions: Vec<Vec3> = records.iter().map(|r| r.position).collect();
                SpatialGrid::build(&positions, settings.grid_resolution)
                    .stratified_sample(target)
                    .into_iter()
                    .map(|i| i as usize)
                    .collect()
            }
        };

        let base_sizes = nodes.base_sizes();
        let points = indices.iter().map(|&i| records[i].position).collect();
        let sizes = indices.iter().map(|&i| base_sizes[i]).collect();
        Self { points, sizes }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Project each sample and a copy displaced by its size along the
    /// camera's right vector; the pixel distance between the two is the
    /// node's footprint. `None` when no sample is in front of the camera.
    pub fn measure(&self, projection: &CameraProjection) -> Option<ScreenSizeSample> {
        let (total, used) = self
            .points
            .iter()
            .zip(&self.sizes)
            .filter_map(|(p, size)| projection.projected_size(*p, *size))
            .fold((0.0_f64, 0_usize), |(sum, n), px| (sum + px as f64, n + 1));

        (used > 0).then(|| ScreenSizeSample {
            average_px: (total / used as f64) as f32,
            samples_used: used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::{GeometrySettings, NodeRecord};
    use std::f32::consts::FRAC_PI_2;

    fn nodes(count: usize, z: f32) -> NodeGeometry {
        let records = (0..count)
            .map(|i| NodeRecord {
                id: i as u32,
                cluster: None,
                year: Some(2000),
                centrality: 0.0,
                position: Vec3::new((i % 10) as f32 * 0.01, 0.0, z),
            })
            .collect();
        NodeGeometry::new(records, &GeometrySettings::default())
    }

    fn camera() -> CameraProjection {
        CameraProjection::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, FRAC_PI_2, Vec2::splat(800.0))
    }

    #[test]
    fn stride_sampling_is_bounded() {
        let settings = LodSettings {
            sample_target: 300,
            ..default()
        };
        let sampler = ScreenSizeSampler::from_nodes(&nodes(10_000, 0.0), &settings);
        assert!(sampler.len() <= 300 && sampler.len() >= 250, "got {}", sampler.len());

        let small = ScreenSizeSampler::from_nodes(&nodes(10, 0.0), &settings);
        assert_eq!(small.len(), 10);
    }

    #[test]
    fn spatial_sampling_is_bounded() {
        let settings = LodSettings {
            sample_target: 50,
            sampling: SampleStrategy::Spatial,
            ..default()
        };
        let sampler = ScreenSizeSampler::from_nodes(&nodes(1_000, 0.0), &settings);
        assert_eq!(sampler.len(), 50);
    }

    #[test]
    fn malformed_nodes_are_never_sampled() {
        let mut records: Vec<NodeRecord> = nodes(4, 0.0).records().to_vec();
        records[1].position = Vec3::new(f32::NAN, 0.0, 0.0);
        let geometry = NodeGeometry::new(records, &GeometrySettings::default());
        let sampler = ScreenSizeSampler::from_nodes(&geometry, &LodSettings::default());
        assert_eq!(sampler.len(), 3);
    }

    #[test]
    fn measure_averages_projected_size() {
        // Unit base size at distance 10 with a 90 degree fov over 800 px.
        let sampler = ScreenSizeSampler::from_nodes(&nodes(20, 0.0), &LodSettings::default());
        let sample = sampler.measure(&camera()).unwrap();
        assert_eq!(sample.samples_used, 20);
        assert!((sample.average_px - 40.0).abs() < 0.1, "got {}", sample.average_px);
    }

    #[test]
    fn samples_behind_camera_are_skipped() {
        let sampler = ScreenSizeSampler::from_nodes(&nodes(20, 50.0), &LodSettings::default());
        assert!(sampler.measure(&camera()).is_none());
    }
}
