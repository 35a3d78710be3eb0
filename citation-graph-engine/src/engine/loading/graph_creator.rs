use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;

use crate::engine::camera::ViewportCamera;
use crate::engine::geometry::{GraphBuilder, GraphDataset, GraphGeometry};
use crate::engine::loading::dataset_loader::DatasetLoader;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::lod::LodController;
use crate::engine::render::{
    EdgeMaterial, GraphEdges, GraphMeshes, GraphNodes, NodeMaterial, create_edge_mesh, create_node_mesh,
};
use crate::engine::settings::EngineSettings;
use crate::engine::visibility::{TimeTravel, VisibilityEngine};

/// Build flat buffers from the dataset and bind the visibility engine and the
/// LOD controller to them. Visibility must initialise after the geometry is
/// in place.
pub fn build_graph_when_ready(
    mut progress: ResMut<LoadingProgress>,
    loader: Res<DatasetLoader>,
    datasets: Res<Assets<GraphDataset>>,
    settings: Res<EngineSettings>,
    mut geometry: ResMut<GraphGeometry>,
    mut visibility: ResMut<VisibilityEngine>,
    mut lod: ResMut<LodController>,
    mut time_travel: ResMut<TimeTravel>,
) {
    if !progress.ready_to_build() {
        return;
    }
    let Some(dataset) = loader.dataset.as_ref().and_then(|h| datasets.get(h)) else {
        return;
    };

    let built = match GraphBuilder::new(&settings.geometry).build(dataset) {
        Ok(built) => built,
        Err(err) => {
            error!("Graph geometry build failed: {}", err);
            progress.failed = Some(err.to_string());
            return;
        }
    };
    *geometry = built;

    if let Err(err) = visibility.init(&mut geometry) {
        error!("{}", err);
        progress.failed = Some(err.to_string());
        return;
    }

    if let Some(nodes) = geometry.nodes.as_ref() {
        lod.set_nodes(nodes);
        if let Some((first, last)) = year_span(nodes.records().iter().filter_map(|r| r.year)) {
            time_travel.configure(first, last);
        }
    }
    if let Some(edges) = geometry.edges.as_ref() {
        lod.set_edges(edges);
    }

    progress.geometry_built = true;
}

fn year_span(years: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    years.fold(None, |span, year| match span {
        None => Some((year, year)),
        Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
    })
}

pub fn spawn_graph_meshes(
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
    mut geometry: ResMut<GraphGeometry>,
    mut lod: ResMut<LodController>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut node_materials: ResMut<Assets<NodeMaterial>>,
    mut edge_materials: ResMut<Assets<EdgeMaterial>>,
) {
    if progress.meshes_spawned {
        return;
    }
    let Some(nodes) = geometry.nodes.as_ref() else {
        warn!("Mesh spawn skipped: node geometry missing");
        return;
    };

    let node_mesh = meshes.add(create_node_mesh(nodes, lod.node_sizes()));
    commands.spawn((
        Mesh3d(node_mesh.clone()),
        MeshMaterial3d(node_materials.add(NodeMaterial::default())),
        Transform::IDENTITY,
        NoFrustumCulling,
        GraphNodes,
    ));

    let edge_mesh = geometry.edges.as_ref().map(|edges| {
        let handle = meshes.add(create_edge_mesh(edges, lod.edge_indices()));
        commands.spawn((
            Mesh3d(handle.clone()),
            MeshMaterial3d(edge_materials.add(EdgeMaterial::default())),
            Transform::IDENTITY,
            GraphEdges,
        ));
        handle
    });

    if let Some((min, max)) = geometry.node_bounds() {
        commands.insert_resource(ViewportCamera::with_bounds(min, max));
    }
    commands.insert_resource(GraphMeshes {
        nodes: node_mesh,
        edges: edge_mesh,
    });

    // The meshes were built from the current buffers.
    if let Some(nodes) = geometry.nodes.as_mut() {
        nodes.visible.take_needs_update();
    }
    if let Some(edges) = geometry.edges.as_mut() {
        edges.visible.take_needs_update();
    }
    lod.take_node_sizes_dirty();
    lod.take_edge_indices_dirty();

    info!("Graph meshes spawned");
    progress.meshes_spawned = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_span_covers_all_years() {
        assert_eq!(year_span([2001, 1995, 2010].into_iter()), Some((1995, 2010)));
        assert_eq!(year_span(std::iter::empty()), None);
    }
}
