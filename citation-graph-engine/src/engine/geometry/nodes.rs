use bevy::prelude::*;
use constants::cluster::cluster_colour;
use serde::{Deserialize, Serialize};

use super::attribute::FloatAttribute;
use super::builder::GeometrySettings;

/// Topic cluster identifier as assigned by the community detection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

/// One paper in the citation network.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: u32,
    pub cluster: Option<ClusterId>,
    pub year: Option<i32>,
    pub centrality: f32,
    pub position: Vec3,
}

impl NodeRecord {
    /// Non-finite coordinates would poison the shader-bound buffers, so such
    /// nodes are never shown.
    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite()
    }
}

/// Node records and their per-node attribute buffers.
#[derive(Debug, Clone)]
pub struct NodeGeometry {
    records: Vec<NodeRecord>,
    base_size: Vec<f32>,
    pub position: FloatAttribute,
    pub color: FloatAttribute,
    pub visible: FloatAttribute,
}

impl NodeGeometry {
    pub fn new(records: Vec<NodeRecord>, settings: &GeometrySettings) -> Self {
        let count = records.len();
        let mut position = Vec::with_capacity(count * 3);
        let mut color = Vec::with_capacity(count * 3);
        let mut base_size = Vec::with_capacity(count);

        for record in &records {
            // Malformed positions are uploaded as the origin; the visible
            // flag keeps them out of the picture.
            let p = if record.is_well_formed() {
                record.position
            } else {
                Vec3::ZERO
            };
            position.extend_from_slice(&p.to_array());

            let linear = cluster_colour(record.cluster.map(|c| c.0)).to_linear();
            color.extend_from_slice(&[linear.red, linear.green, linear.blue]);

            let centrality = if record.centrality.is_finite() {
                record.centrality.max(0.0)
            } else {
                0.0
            };
            base_size.push(settings.base_node_size * (1.0 + centrality * settings.centrality_size_scale));
        }

        Self {
            records,
            base_size,
            position: FloatAttribute::new(position, 3),
            color: FloatAttribute::new(color, 3),
            visible: FloatAttribute::filled(count, 1, 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&NodeRecord> {
        self.records.get(index)
    }

    /// World-space point size before any LOD multiplier.
    pub fn base_sizes(&self) -> &[f32] {
        &self.base_size
    }

    pub fn malformed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_well_formed()).count()
    }
}
