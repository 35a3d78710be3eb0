use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use super::material::{ATTRIBUTE_CORNER, ATTRIBUTE_NODE_SIZE, ATTRIBUTE_VISIBLE};
use crate::engine::geometry::{EdgeGeometry, NodeGeometry};

const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Component)]
pub struct GraphNodes;

#[derive(Component)]
pub struct GraphEdges;

/// Mesh handles the sync systems write into.
#[derive(Resource, Debug, Clone)]
pub struct GraphMeshes {
    pub nodes: Handle<Mesh>,
    pub edges: Option<Handle<Mesh>>,
}

/// Repeat each per-node value for the four billboard vertices.
pub fn expand_per_node<T: Copy>(values: &[T]) -> Vec<T> {
    values.iter().flat_map(|v| [*v; 4]).collect()
}

fn rgb_to_rgba(rgb: &[f32], alpha: f32) -> Vec<[f32; 4]> {
    rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2], alpha]).collect()
}

fn xyz(values: &[f32]) -> Vec<[f32; 3]> {
    values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

/// One camera-facing quad per node. `sizes` come from the LOD front buffer.
pub fn create_node_mesh(nodes: &NodeGeometry, sizes: &[f32]) -> Mesh {
    let count = nodes.len();
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, expand_per_node(&xyz(nodes.position.as_slice())));
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, expand_per_node(&rgb_to_rgba(nodes.color.as_slice(), 1.0)));
    mesh.insert_attribute(ATTRIBUTE_VISIBLE, expand_per_node(nodes.visible.as_slice()));
    mesh.insert_attribute(ATTRIBUTE_NODE_SIZE, expand_per_node(sizes));
    mesh.insert_attribute(
        ATTRIBUTE_CORNER,
        (0..count).flat_map(|_| QUAD_CORNERS).collect::<Vec<[f32; 2]>>(),
    );

    let indices = (0..count as u32)
        .flat_map(|node| QUAD_INDICES.map(|i| node * 4 + i))
        .collect();
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Edge polylines as a line list over the LOD-selected segment indices.
pub fn create_edge_mesh(edges: &EdgeGeometry, segment_indices: &[u32]) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, xyz(edges.position.as_slice()));
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, rgb_to_rgba(edges.color.as_slice(), 0.6));
    mesh.insert_attribute(ATTRIBUTE_VISIBLE, edges.visible.as_slice().to_vec());
    mesh.insert_indices(Indices::U32(segment_indices.to_vec()));
    mesh
}

pub fn write_node_visibility(mesh: &mut Mesh, visible: &[f32]) {
    mesh.insert_attribute(ATTRIBUTE_VISIBLE, expand_per_node(visible));
}

pub fn write_node_sizes(mesh: &mut Mesh, sizes: &[f32]) {
    mesh.insert_attribute(ATTRIBUTE_NODE_SIZE, expand_per_node(sizes));
}

pub fn write_edge_visibility(mesh: &mut Mesh, visible: &[f32]) {
    mesh.insert_attribute(ATTRIBUTE_VISIBLE, visible.to_vec());
}

pub fn write_edge_indices(mesh: &mut Mesh, segment_indices: &[u32]) {
    mesh.insert_indices(Indices::U32(segment_indices.to_vec()));
}
