use bevy::prelude::*;

use crate::engine::geometry::GraphGeometry;
use crate::engine::lod::LodController;
use crate::engine::render::GraphMeshes;
use crate::engine::render::graph_mesh::{
    write_edge_indices, write_edge_visibility, write_node_sizes, write_node_visibility,
};

/// Upload buffers whose dirty flag is set. The LOD buffers are read from the
/// front side only, so a pass that is mid-write is never observed.
pub fn sync_graph_meshes(
    graph_meshes: Option<Res<GraphMeshes>>,
    mut geometry: ResMut<GraphGeometry>,
    mut lod: ResMut<LodController>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let Some(graph_meshes) = graph_meshes else {
        return;
    };

    if let Some(mesh) = meshes.get_mut(&graph_meshes.nodes) {
        if let Some(nodes) = geometry.nodes.as_mut() {
            if nodes.visible.take_needs_update() {
                write_node_visibility(mesh, nodes.visible.as_slice());
            }
        }
        if lod.take_node_sizes_dirty() {
            write_node_sizes(mesh, lod.node_sizes());
        }
    }

    let Some(edge_handle) = graph_meshes.edges.as_ref() else {
        return;
    };
    if let Some(mesh) = meshes.get_mut(edge_handle) {
        if let Some(edges) = geometry.edges.as_mut() {
            if edges.visible.take_needs_update() {
                write_edge_visibility(mesh, edges.visible.as_slice());
            }
        }
        if lod.take_edge_indices_dirty() {
            write_edge_indices(mesh, lod.edge_indices());
        }
    }
}
