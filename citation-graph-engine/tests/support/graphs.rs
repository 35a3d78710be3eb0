#![allow(dead_code)]

use citation_graph_engine::engine::geometry::{
    DatasetEdge, DatasetNode, GeometrySettings, GraphBuilder, GraphDataset, GraphGeometry,
};
use citation_graph_engine::engine::visibility::VisibilityEngine;

pub fn node(id: u32, cluster: Option<u32>, year: Option<f64>, position: [f64; 3]) -> DatasetNode {
    DatasetNode {
        id,
        cluster,
        year,
        centrality: 0.0,
        position,
    }
}

pub fn edge(source: u32, target: u32, year: Option<f64>) -> DatasetEdge {
    DatasetEdge {
        id: None,
        source,
        target,
        year,
    }
}

/// `per_year` nodes for every integer year in `first..=last`, laid out on a
/// grid in the z = 0 plane.
pub fn uniform_year_nodes(first: i32, last: i32, per_year: usize) -> Vec<DatasetNode> {
    let mut nodes = Vec::new();
    for year in first..=last {
        for _ in 0..per_year {
            let id = nodes.len() as u32;
            let position = [(id % 100) as f64, (id / 100) as f64, 0.0];
            nodes.push(node(id, Some(id % 4), Some(year as f64), position));
        }
    }
    nodes
}

/// Cluster 0 ("A") nodes 0..4 and cluster 1 ("B") nodes 4..8, with five
/// A→A, five A→B and five B→B citations.
pub fn two_cluster_dataset() -> GraphDataset {
    let nodes = (0..8)
        .map(|id| node(id, Some(id / 4), Some(2005.0), [id as f64, 0.0, 0.0]))
        .collect();
    let pairs = [
        (0, 1),
        (0, 2),
        (1, 2),
        (1, 3),
        (2, 3),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
        (0, 7),
        (4, 5),
        (4, 6),
        (5, 6),
        (5, 7),
        (6, 7),
    ];
    let edges = pairs.iter().map(|&(s, t)| edge(s, t, None)).collect();
    GraphDataset { nodes, edges }
}

pub fn build(dataset: &GraphDataset) -> GraphGeometry {
    GraphBuilder::new(&GeometrySettings::default())
        .build(dataset)
        .expect("fixture geometry is valid")
}

/// Geometry with visibility bound and initialised.
pub fn build_visible(dataset: &GraphDataset) -> (GraphGeometry, VisibilityEngine) {
    let mut geometry = build(dataset);
    let mut engine = VisibilityEngine::default();
    engine.init(&mut geometry).expect("geometry is complete");
    (geometry, engine)
}

pub fn visible_node_count(geometry: &GraphGeometry) -> usize {
    geometry
        .nodes
        .as_ref()
        .map(|nodes| nodes.visible.as_slice().iter().filter(|v| **v > 0.5).count())
        .unwrap_or(0)
}
