//! Flat per-element attribute buffers shared by the visibility engine, the
//! LOD controller and the renderer.
//!
//! Node buffers are indexed per node. Edge buffers are indexed per rendered
//! vertex: every edge is a polyline occupying a half-open vertex range
//! `[start, end)` of the shared edge vertex buffers.

/// Single GPU-bound float attribute with a dirty flag.
pub mod attribute;

/// Dataset to geometry conversion: palette colours, curved edge polylines.
pub mod builder;

/// Front/back buffer pair with an explicit swap.
pub mod double_buffer;

/// Edge records and per-vertex edge buffers.
pub mod edges;

/// Node records and per-node buffers.
pub mod nodes;

use bevy::prelude::*;
use thiserror::Error;

pub use attribute::FloatAttribute;
pub use builder::{DatasetEdge, DatasetNode, GeometrySettings, GraphBuilder, GraphDataset};
pub use double_buffer::DoubleBuffer;
pub use edges::{EdgeGeometry, EdgeRecord};
pub use nodes::{ClusterId, NodeGeometry, NodeRecord};

/// Construction-time failures. Runtime operations never return these; they
/// log and keep the previous buffers.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("edge {edge_id} has an empty or inverted vertex range {start}..{end}")]
    EmptyVertexRange { edge_id: u32, start: u32, end: u32 },

    #[error("edge {edge_id} starts at vertex {start} before the previous edge ends at {previous_end}")]
    OverlappingVertexRange {
        edge_id: u32,
        start: u32,
        previous_end: u32,
    },

    #[error("edge {edge_id} ends at vertex {end} but only {vertex_count} vertices exist")]
    VertexRangeOutOfBounds {
        edge_id: u32,
        end: u32,
        vertex_count: u32,
    },

    #[error("{attribute} buffer holds {actual} floats, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Shared store of node and edge geometry. Either half may be absent while
/// the dataset is still loading.
#[derive(Resource, Default, Debug)]
pub struct GraphGeometry {
    pub nodes: Option<NodeGeometry>,
    pub edges: Option<EdgeGeometry>,
}

impl GraphGeometry {
    pub fn new(nodes: NodeGeometry, edges: EdgeGeometry) -> Self {
        Self {
            nodes: Some(nodes),
            edges: Some(edges),
        }
    }

    pub fn set_nodes(&mut self, nodes: NodeGeometry) {
        self.nodes = Some(nodes);
    }

    pub fn set_edges(&mut self, edges: EdgeGeometry) {
        self.edges = Some(edges);
    }

    pub fn is_complete(&self) -> bool {
        self.nodes.is_some() && self.edges.is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.as_ref().map_or(0, NodeGeometry::len)
    }

    pub fn edge_vertex_count(&self) -> usize {
        self.edges.as_ref().map_or(0, EdgeGeometry::vertex_count)
    }

    /// World-space bounds of all well-formed node positions.
    pub fn node_bounds(&self) -> Option<(Vec3, Vec3)> {
        let nodes = self.nodes.as_ref()?;
        nodes
            .records()
            .iter()
            .filter(|record| record.is_well_formed())
            .fold(None, |bounds, record| match bounds {
                None => Some((record.position, record.position)),
                Some((min, max)) => Some((min.min(record.position), max.max(record.position))),
            })
    }
}
