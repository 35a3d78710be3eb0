//! End-to-end filter scenarios over geometry built from datasets.

mod support;

use citation_graph_engine::engine::geometry::{
    ClusterId, GeometrySettings, GraphBuilder, GraphDataset,
};
use citation_graph_engine::engine::visibility::{ClusterSelection, EdgeClusterPolicy};
use support::graphs::*;

fn selection(ids: &[u32]) -> ClusterSelection {
    ids.iter().copied().map(ClusterId).collect()
}

#[test]
fn year_window_over_uniform_years_is_exact() {
    // 31 years × 323 nodes = 10,013 nodes.
    let dataset = GraphDataset {
        nodes: uniform_year_nodes(1990, 2020, 323),
        edges: Vec::new(),
    };
    let (mut geometry, mut engine) = build_visible(&dataset);
    assert_eq!(visible_node_count(&geometry), 10_013);

    engine.update_year_visibility(&mut geometry, 2000, 2010);

    assert_eq!(visible_node_count(&geometry), 11 * 323);
    assert_eq!(engine.stats(&geometry).visible_nodes, 11 * 323);
}

#[test]
fn cluster_selection_keeps_only_internal_edges() {
    let (mut geometry, mut engine) = build_visible(&two_cluster_dataset());

    engine.update_cluster_visibility(&mut geometry, selection(&[0]));

    let stats = engine.stats(&geometry);
    assert_eq!(stats.total_edges, 15);
    assert_eq!(stats.visible_edges, 5);
    assert_eq!(stats.visible_nodes, 4);

    let edges = geometry.edges.as_ref().unwrap();
    let visible = edges.visible.as_slice();
    for record in edges.records() {
        let shown = visible[record.vertex_slots()].iter().all(|v| *v == 1.0);
        let internal = record.source < 4 && record.target < 4;
        assert_eq!(shown, internal, "edge {} -> {}", record.source, record.target);
    }
}

#[test]
fn either_endpoint_policy_shows_bridging_edges() {
    let (mut geometry, mut engine) = build_visible(&two_cluster_dataset());

    engine.set_edge_cluster_policy(&mut geometry, EdgeClusterPolicy::EitherEndpoint);
    engine.update_cluster_visibility(&mut geometry, selection(&[0]));

    assert_eq!(engine.stats(&geometry).visible_edges, 10);
}

#[test]
fn empty_selection_is_no_filter() {
    let (mut geometry, mut engine) = build_visible(&two_cluster_dataset());

    engine.update_cluster_visibility(&mut geometry, selection(&[1]));
    engine.update_cluster_visibility(&mut geometry, ClusterSelection::all());

    let stats = engine.stats(&geometry);
    assert_eq!(stats.visible_nodes, 8);
    assert_eq!(stats.visible_edges, 15);
}

#[test]
fn filters_compose_as_and() {
    let dataset = GraphDataset {
        nodes: uniform_year_nodes(2000, 2003, 8),
        edges: Vec::new(),
    };
    let (mut geometry, mut engine) = build_visible(&dataset);

    engine.update_year_visibility(&mut geometry, 2001, 2002);
    engine.update_cluster_visibility(&mut geometry, selection(&[1]));

    // Two years × eight nodes, a quarter of them in cluster 1.
    assert_eq!(visible_node_count(&geometry), 4);

    // Order of application does not matter.
    let (mut other, mut engine_b) = build_visible(&dataset);
    engine_b.update_cluster_visibility(&mut other, selection(&[1]));
    engine_b.update_year_visibility(&mut other, 2001, 2002);
    assert_eq!(
        geometry.nodes.as_ref().unwrap().visible.as_slice(),
        other.nodes.as_ref().unwrap().visible.as_slice()
    );
}

#[test]
fn edges_inherit_the_later_endpoint_year() {
    let dataset = GraphDataset {
        nodes: vec![
            node(0, Some(0), Some(1995.0), [0.0, 0.0, 0.0]),
            node(1, Some(0), Some(2005.0), [1.0, 0.0, 0.0]),
        ],
        edges: vec![edge(1, 0, None)],
    };
    let (mut geometry, mut engine) = build_visible(&dataset);

    engine.update_year_visibility(&mut geometry, 1990, 2000);
    assert_eq!(engine.stats(&geometry).visible_edges, 0);

    engine.update_year_visibility(&mut geometry, 2005, 2005);
    assert_eq!(engine.stats(&geometry).visible_edges, 1);
}

#[test]
fn malformed_nodes_stay_hidden_after_clear() {
    let dataset = GraphDataset {
        nodes: vec![
            node(0, Some(0), Some(2000.0), [0.0, 0.0, 0.0]),
            node(1, Some(0), Some(2000.0), [f64::NAN, 0.0, 0.0]),
            node(2, Some(0), None, [2.0, 0.0, 0.0]),
        ],
        edges: Vec::new(),
    };
    let (mut geometry, mut engine) = build_visible(&dataset);

    engine.update_year_visibility(&mut geometry, 1900, 2100);
    assert_eq!(visible_node_count(&geometry), 1);

    engine.clear_filters(&mut geometry);
    assert_eq!(visible_node_count(&geometry), 2);
}

#[test]
fn node_reload_drops_the_cluster_filter_on_edges_too() {
    let mut dataset = two_cluster_dataset();
    let (mut geometry, mut engine) = build_visible(&dataset);
    engine.update_cluster_visibility(&mut geometry, selection(&[0]));
    assert_eq!(engine.stats(&geometry).visible_edges, 5);

    dataset.nodes.push(node(8, Some(1), Some(2005.0), [8.0, 0.0, 0.0]));
    geometry.set_nodes(GraphBuilder::new(&GeometrySettings::default()).build_nodes(&dataset));
    engine.update_year_visibility(&mut geometry, 1990, 2020);

    // Selection and buffers must agree: no filter reported, none applied.
    assert!(engine.selection().is_unfiltered());
    let stats = engine.stats(&geometry);
    assert_eq!(stats.visible_nodes, 9);
    assert_eq!(stats.visible_edges, 15);
    assert!(engine.edge_cluster_visibility().iter().all(|v| *v == 1.0));
}
