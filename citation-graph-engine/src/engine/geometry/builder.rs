use std::collections::HashMap;

use bevy::prelude::*;
use constants::render_settings::{
    BASE_NODE_SIZE, CENTRALITY_SIZE_SCALE, EDGE_COLOUR_FACTOR, EDGE_CURVE_LIFT, EDGE_CURVE_SEGMENTS,
};
use serde::{Deserialize, Serialize};

use super::edges::{EdgeGeometry, EdgeRecord};
use super::nodes::{ClusterId, NodeGeometry, NodeRecord};
use super::{GeometryError, GraphGeometry};

/// Citation graph as shipped by the preprocessing pipeline (`*.graph.json`).
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDataset {
    pub nodes: Vec<DatasetNode>,
    #[serde(default)]
    pub edges: Vec<DatasetEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetNode {
    pub id: u32,
    #[serde(default)]
    pub cluster: Option<u32>,
    #[serde(default)]
    pub year: Option<f64>,
    #[serde(default)]
    pub centrality: f32,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEdge {
    #[serde(default)]
    pub id: Option<u32>,
    pub source: u32,
    pub target: u32,
    #[serde(default)]
    pub year: Option<f64>,
}

/// Geometry construction tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    pub base_node_size: f32,
    pub centrality_size_scale: f32,
    pub edge_curve_segments: u32,
    pub edge_curve_lift: f32,
    pub edge_colour_factor: f32,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            base_node_size: BASE_NODE_SIZE,
            centrality_size_scale: CENTRALITY_SIZE_SCALE,
            edge_curve_segments: EDGE_CURVE_SEGMENTS,
            edge_curve_lift: EDGE_CURVE_LIFT,
            edge_colour_factor: EDGE_COLOUR_FACTOR,
        }
    }
}

/// Builds node and edge buffers from a dataset.
pub struct GraphBuilder<'a> {
    settings: &'a GeometrySettings,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(settings: &'a GeometrySettings) -> Self {
        Self { settings }
    }

    pub fn build(&self, dataset: &GraphDataset) -> Result<GraphGeometry, GeometryError> {
        let nodes = self.build_nodes(dataset);
        let edges = self.build_edges(dataset, &nodes)?;
        Ok(GraphGeometry::new(nodes, edges))
    }

    pub fn build_nodes(&self, dataset: &GraphDataset) -> NodeGeometry {
        let records = dataset
            .nodes
            .iter()
            .map(|node| NodeRecord {
                id: node.id,
                cluster: node.cluster.map(ClusterId),
                year: year_from(node.year),
                centrality: node.centrality,
                position: Vec3::new(
                    node.position[0] as f32,
                    node.position[1] as f32,
                    node.position[2] as f32,
                ),
            })
            .collect();

        NodeGeometry::new(records, self.settings)
    }

    /// Each edge becomes a quadratic Bézier polyline lifted above the chord.
    /// Edges with an unknown endpoint are dropped.
    pub fn build_edges(
        &self,
        dataset: &GraphDataset,
        nodes: &NodeGeometry,
    ) -> Result<EdgeGeometry, GeometryError> {
        let index_of: HashMap<u32, usize> = nodes
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id, i))
            .collect();

        let segments = self.settings.edge_curve_segments.max(1);
        let mut records = Vec::with_capacity(dataset.edges.len());
        let mut positions = Vec::with_capacity(dataset.edges.len() * (segments as usize + 1) * 3);
        let mut colors = Vec::with_capacity(positions.capacity());
        let mut dangling = 0usize;

        for (i, edge) in dataset.edges.iter().enumerate() {
            let (Some(&source), Some(&target)) = (index_of.get(&edge.source), index_of.get(&edge.target))
            else {
                dangling += 1;
                continue;
            };
            let (source, target) = (&nodes.records()[source], &nodes.records()[target]);

            let start = (positions.len() / 3) as u32;
            let from = source.position;
            let to = target.position;
            let control = (from + to) * 0.5 + Vec3::Y * from.distance(to) * self.settings.edge_curve_lift;

            let colour = nodes.color.item(index_of[&edge.source]);
            let factor = self.settings.edge_colour_factor;
            for step in 0..=segments {
                let t = step as f32 / segments as f32;
                let u = 1.0 - t;
                let point = from * (u * u) + control * (2.0 * u * t) + to * (t * t);
                positions.extend_from_slice(&point.to_array());
                colors.extend(colour.iter().map(|c| c * factor));
            }

            records.push(EdgeRecord {
                id: edge.id.unwrap_or(i as u32),
                source: edge.source,
                target: edge.target,
                year: year_from(edge.year).or_else(|| source.year.max(target.year)),
                source_cluster: source.cluster,
                target_cluster: target.cluster,
                vertex_range: start..start + segments + 1,
            });
        }

        if dangling > 0 {
            warn!("Dropped {} edges referencing unknown nodes", dangling);
        }

        EdgeGeometry::new(records, positions, colors)
    }
}

/// Non-finite or out-of-range years count as missing.
fn year_from(value: Option<f64>) -> Option<i32> {
    value
        .filter(|year| year.is_finite() && year.abs() < i32::MAX as f64)
        .map(|year| year.trunc() as i32)
}
