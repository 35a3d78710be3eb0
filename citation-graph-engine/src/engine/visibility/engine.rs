use bevy::prelude::*;
use serde::Serialize;
use thiserror::Error;

use super::filters::{ClusterSelection, EdgeClusterPolicy, YearRange};
use crate::engine::geometry::{EdgeGeometry, GraphGeometry, NodeGeometry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisibilityError {
    #[error("visibility cannot initialise before the {missing} geometry exists")]
    GeometryNotReady { missing: &'static str },
}

/// Counts reported to the page after each filter change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityStats {
    pub total_nodes: usize,
    pub visible_nodes: usize,
    pub total_edges: usize,
    pub visible_edges: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initialized,
}

/// Owns the four filter arrays (year and cluster, for nodes and for edge
/// vertices) and writes their AND into the geometry's `visible` attributes.
///
/// Values are 0.0 or 1.0 so the arrays can be uploaded as-is, and so that
/// the product of two flags is their logical AND. Every operation other
/// than `init` tolerates missing geometry: UI events can fire before the
/// dataset has loaded, and those calls log and return.
#[derive(Resource, Debug)]
pub struct VisibilityEngine {
    phase: Phase,
    policy: EdgeClusterPolicy,
    node_year: Vec<f32>,
    node_cluster: Vec<f32>,
    edge_year: Vec<f32>,
    edge_cluster: Vec<f32>,
    year_range: Option<YearRange>,
    selection: ClusterSelection,
    latest_stats: VisibilityStats,
}

impl Default for VisibilityEngine {
    fn default() -> Self {
        Self::new(EdgeClusterPolicy::default())
    }
}

impl VisibilityEngine {
    pub fn new(policy: EdgeClusterPolicy) -> Self {
        Self {
            phase: Phase::Uninitialized,
            policy,
            node_year: Vec::new(),
            node_cluster: Vec::new(),
            edge_year: Vec::new(),
            edge_cluster: Vec::new(),
            year_range: None,
            selection: ClusterSelection::all(),
            latest_stats: VisibilityStats::default(),
        }
    }

    /// Allocate all four arrays fully visible and publish them. Must run after
    /// both node and edge geometry exist. Calling it again discards any
    /// active filters.
    pub fn init(&mut self, geometry: &mut GraphGeometry) -> Result<(), VisibilityError> {
        let Some(nodes) = geometry.nodes.as_ref() else {
            return Err(VisibilityError::GeometryNotReady { missing: "node" });
        };
        let Some(edges) = geometry.edges.as_ref() else {
            return Err(VisibilityError::GeometryNotReady { missing: "edge" });
        };

        if self.phase == Phase::Initialized {
            info!("Re-initialising visibility; active year and cluster filters are discarded");
        }

        self.reset_node_arrays(nodes);
        self.reset_edge_arrays(edges);
        self.year_range = None;
        self.selection = ClusterSelection::all();
        self.phase = Phase::Initialized;

        info!(
            "Visibility initialised for {} nodes and {} edge vertices",
            nodes.len(),
            edges.vertex_count()
        );
        self.apply_visibility(geometry);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == Phase::Initialized
    }

    /// Show elements whose year lies in `[from_year, to_year]`. Elements
    /// without a year, or with non-finite coordinates, are hidden.
    pub fn update_year_visibility(&mut self, geometry: &mut GraphGeometry, from_year: i32, to_year: i32) {
        if !self.ready_for("year filter", geometry) {
            return;
        }
        self.ensure_sizes(geometry);

        let range = YearRange::new(from_year, to_year);

        if let Some(nodes) = geometry.nodes.as_ref() {
            let mut missing = 0usize;
            for (flag, record) in self.node_year.iter_mut().zip(nodes.records()) {
                let visible = record.is_well_formed()
                    && match record.year {
                        Some(year) => range.contains(year),
                        None => {
                            missing += 1;
                            false
                        }
                    };
                *flag = as_flag(visible);
            }
            if missing > 0 {
                warn!("{} nodes have no publication year and stay hidden under the year filter", missing);
            }
        }

        if let Some(edges) = geometry.edges.as_ref() {
            let mut missing = 0usize;
            for (index, record) in edges.records().iter().enumerate() {
                let visible = !edges.is_malformed(index)
                    && match record.year {
                        Some(year) => range.contains(year),
                        None => {
                            missing += 1;
                            false
                        }
                    };
                self.edge_year[record.vertex_slots()].fill(as_flag(visible));
            }
            if missing > 0 {
                warn!("{} edges have no publication year and stay hidden under the year filter", missing);
            }
        }

        self.year_range = Some(range);
        debug!("Year filter set to {}..={}", from_year, to_year);
        self.apply_visibility(geometry);
    }

    /// Show nodes in the selected clusters and edges admitted by the edge
    /// cluster policy. An empty selection shows everything.
    pub fn update_cluster_visibility(&mut self, geometry: &mut GraphGeometry, selection: ClusterSelection) {
        if !self.ready_for("cluster filter", geometry) {
            return;
        }
        self.ensure_sizes(geometry);

        if let Some(nodes) = geometry.nodes.as_ref() {
            for (flag, record) in self.node_cluster.iter_mut().zip(nodes.records()) {
                *flag = as_flag(selection.admits(record.cluster));
            }
        }

        if let Some(edges) = geometry.edges.as_ref() {
            for record in edges.records() {
                let visible = selection.admits_edge(record.source_cluster, record.target_cluster, self.policy);
                self.edge_cluster[record.vertex_slots()].fill(as_flag(visible));
            }
        }

        debug!("Cluster filter set to {} clusters", selection.len());
        self.selection = selection;
        self.apply_visibility(geometry);
    }

    /// Switch the edge cluster policy and recompute the cluster filter.
    pub fn set_edge_cluster_policy(&mut self, geometry: &mut GraphGeometry, policy: EdgeClusterPolicy) {
        self.policy = policy;
        let selection = self.selection.clone();
        self.update_cluster_visibility(geometry, selection);
    }

    /// Drop both filters, keeping malformed elements hidden.
    pub fn clear_filters(&mut self, geometry: &mut GraphGeometry) {
        if !self.ready_for("filter reset", geometry) {
            return;
        }
        if let Some(nodes) = geometry.nodes.as_ref() {
            self.reset_node_arrays(nodes);
        }
        if let Some(edges) = geometry.edges.as_ref() {
            self.reset_edge_arrays(edges);
        }
        self.year_range = None;
        self.selection = ClusterSelection::all();
        self.apply_visibility(geometry);
    }

    /// Write `visible = year AND cluster` for every node and edge vertex and
    /// flag the attributes for upload. Idempotent.
    pub fn apply_visibility(&mut self, geometry: &mut GraphGeometry) {
        if !self.ready_for("visibility apply", geometry) {
            return;
        }
        self.ensure_sizes(geometry);

        if let Some(nodes) = geometry.nodes.as_mut() {
            combine(&self.node_year, &self.node_cluster, nodes.visible.as_mut_slice());
            nodes.visible.mark_dirty();
        }
        if let Some(edges) = geometry.edges.as_mut() {
            combine(&self.edge_year, &self.edge_cluster, edges.visible.as_mut_slice());
            edges.visible.mark_dirty();
        }
        self.latest_stats = self.stats(geometry);
    }

    pub fn stats(&self, geometry: &GraphGeometry) -> VisibilityStats {
        let mut stats = VisibilityStats::default();
        if let Some(nodes) = geometry.nodes.as_ref() {
            stats.total_nodes = nodes.len();
            stats.visible_nodes = nodes.visible.as_slice().iter().filter(|v| **v > 0.5).count();
        }
        if let Some(edges) = geometry.edges.as_ref() {
            let visible = edges.visible.as_slice();
            stats.total_edges = edges.len();
            stats.visible_edges = edges
                .records()
                .iter()
                .filter(|record| visible[record.vertex_range.start as usize] > 0.5)
                .count();
        }
        stats
    }

    /// Counts as of the last `apply_visibility`, without rescanning.
    pub fn latest_stats(&self) -> VisibilityStats {
        self.latest_stats
    }

    pub fn node_year_visibility(&self) -> &[f32] {
        &self.node_year
    }

    pub fn node_cluster_visibility(&self) -> &[f32] {
        &self.node_cluster
    }

    pub fn edge_year_visibility(&self) -> &[f32] {
        &self.edge_year
    }

    pub fn edge_cluster_visibility(&self) -> &[f32] {
        &self.edge_cluster
    }

    pub fn year_range(&self) -> Option<YearRange> {
        self.year_range
    }

    pub fn selection(&self) -> &ClusterSelection {
        &self.selection
    }

    pub fn edge_cluster_policy(&self) -> EdgeClusterPolicy {
        self.policy
    }

    fn ready_for(&self, operation: &str, geometry: &GraphGeometry) -> bool {
        if self.phase == Phase::Uninitialized {
            warn!("{} requested before visibility was initialised; ignored", operation);
            return false;
        }
        if geometry.nodes.is_none() && geometry.edges.is_none() {
            warn!("{} requested without node or edge geometry; ignored", operation);
            return false;
        }
        true
    }

    /// A length disagreement (e.g. after a data reload) resets the arrays to
    /// their defaults rather than patching them, since a partial repair would
    /// silently misalign element identity and array index. Filters are
    /// dropped for both nodes and edges so the reported year window and
    /// selection always describe every array.
    fn ensure_sizes(&mut self, geometry: &GraphGeometry) {
        let nodes_stale = geometry.nodes.as_ref().is_some_and(|nodes| {
            self.node_year.len() != nodes.len() || self.node_cluster.len() != nodes.len()
        });
        let edges_stale = geometry.edges.as_ref().is_some_and(|edges| {
            let vertices = edges.vertex_count();
            self.edge_year.len() != vertices || self.edge_cluster.len() != vertices
        });
        if !nodes_stale && !edges_stale {
            return;
        }

        warn!(
            "Visibility arrays hold {} node and {} edge vertex entries for {} nodes and {} edge vertices; resetting to visible and discarding filters",
            self.node_year.len(),
            self.edge_year.len(),
            geometry.node_count(),
            geometry.edge_vertex_count()
        );
        if let Some(nodes) = geometry.nodes.as_ref() {
            self.reset_node_arrays(nodes);
        }
        if let Some(edges) = geometry.edges.as_ref() {
            self.reset_edge_arrays(edges);
        }
        self.forget_filters();
    }

    fn forget_filters(&mut self) {
        self.year_range = None;
        self.selection = ClusterSelection::all();
    }

    fn reset_node_arrays(&mut self, nodes: &NodeGeometry) {
        self.node_year = nodes
            .records()
            .iter()
            .map(|record| as_flag(record.is_well_formed()))
            .collect();
        self.node_cluster = vec![1.0; nodes.len()];
    }

    fn reset_edge_arrays(&mut self, edges: &EdgeGeometry) {
        self.edge_year = vec![1.0; edges.vertex_count()];
        for (index, record) in edges.records().iter().enumerate() {
            if edges.is_malformed(index) {
                self.edge_year[record.vertex_slots()].fill(0.0);
            }
        }
        self.edge_cluster = vec![1.0; edges.vertex_count()];
    }
}

fn as_flag(visible: bool) -> f32 {
    if visible { 1.0 } else { 0.0 }
}

fn combine(year: &[f32], cluster: &[f32], visible: &mut [f32]) {
    for ((out, y), c) in visible.iter_mut().zip(year).zip(cluster) {
        *out = y * c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::{ClusterId, EdgeRecord, GeometrySettings, NodeRecord};

    fn geometry() -> GraphGeometry {
        let nodes = NodeGeometry::new(
            vec![
                node(0, 1, Some(1999)),
                node(1, 1, Some(2000)),
                node(2, 2, Some(2010)),
                node(3, 2, None),
            ],
            &GeometrySettings::default(),
        );
        let edges = EdgeGeometry::new(
            vec![
                edge(0, (0, 1), Some(2000), (1, 1), 0..3),
                edge(1, (1, 2), Some(2010), (1, 2), 3..6),
            ],
            vec![0.0; 18],
            vec![1.0; 18],
        )
        .unwrap();
        GraphGeometry::new(nodes, edges)
    }

    fn node(id: u32, cluster: u32, year: Option<i32>) -> NodeRecord {
        NodeRecord {
            id,
            cluster: Some(ClusterId(cluster)),
            year,
            centrality: 0.0,
            position: Vec3::splat(id as f32),
        }
    }

    fn edge(id: u32, ends: (u32, u32), year: Option<i32>, clusters: (u32, u32), range: std::ops::Range<u32>) -> EdgeRecord {
        EdgeRecord {
            id,
            source: ends.0,
            target: ends.1,
            year,
            source_cluster: Some(ClusterId(clusters.0)),
            target_cluster: Some(ClusterId(clusters.1)),
            vertex_range: range,
        }
    }

    fn initialised() -> (VisibilityEngine, GraphGeometry) {
        let mut geometry = geometry();
        let mut engine = VisibilityEngine::default();
        engine.init(&mut geometry).unwrap();
        (engine, geometry)
    }

    #[test]
    fn init_requires_both_geometry_halves() {
        let mut engine = VisibilityEngine::default();
        let mut empty = GraphGeometry::default();
        assert_eq!(
            engine.init(&mut empty),
            Err(VisibilityError::GeometryNotReady { missing: "node" })
        );

        let mut nodes_only = geometry();
        nodes_only.edges = None;
        assert_eq!(
            engine.init(&mut nodes_only),
            Err(VisibilityError::GeometryNotReady { missing: "edge" })
        );
        assert!(!engine.is_initialized());
    }

    #[test]
    fn init_allocates_all_visible() {
        let (engine, geometry) = initialised();
        assert_eq!(engine.node_year_visibility(), &[1.0; 4]);
        assert_eq!(engine.edge_cluster_visibility(), &[1.0; 6]);
        assert_eq!(geometry.nodes.as_ref().unwrap().visible.as_slice(), &[1.0; 4]);
    }

    #[test]
    fn updates_before_init_are_ignored() {
        let mut geometry = geometry();
        let mut engine = VisibilityEngine::default();
        engine.update_year_visibility(&mut geometry, 2005, 2006);
        engine.update_cluster_visibility(&mut geometry, [ClusterId(9)].into_iter().collect());
        assert_eq!(geometry.nodes.as_ref().unwrap().visible.as_slice(), &[1.0; 4]);
    }

    #[test]
    fn year_filter_hides_missing_years() {
        let (mut engine, mut geometry) = initialised();
        engine.update_year_visibility(&mut geometry, 2000, 2010);
        assert_eq!(engine.node_year_visibility(), &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(engine.year_range(), Some(YearRange::new(2000, 2010)));
    }

    #[test]
    fn filters_combine_by_and() {
        let (mut engine, mut geometry) = initialised();
        engine.update_year_visibility(&mut geometry, 2000, 2010);
        engine.update_cluster_visibility(&mut geometry, [ClusterId(2)].into_iter().collect());

        let nodes = geometry.nodes.as_ref().unwrap();
        assert_eq!(nodes.visible.as_slice(), &[0.0, 0.0, 1.0, 0.0]);

        let edges = geometry.edges.as_ref().unwrap();
        assert_eq!(edges.visible.as_slice(), &[0.0; 6]);
    }

    #[test]
    fn edge_vertices_share_one_value() {
        let (mut engine, mut geometry) = initialised();
        engine.update_year_visibility(&mut geometry, 2005, 2012);
        let visible = geometry.edges.as_ref().unwrap().visible.as_slice();
        assert_eq!(&visible[0..3], &[0.0; 3]);
        assert_eq!(&visible[3..6], &[1.0; 3]);
    }

    #[test]
    fn apply_marks_attributes_dirty() {
        let (mut engine, mut geometry) = initialised();
        geometry.nodes.as_mut().unwrap().visible.take_needs_update();
        engine.apply_visibility(&mut geometry);
        assert!(geometry.nodes.as_mut().unwrap().visible.take_needs_update());
    }

    #[test]
    fn size_mismatch_resets_to_visible() {
        let (mut engine, mut geometry) = initialised();
        engine.update_cluster_visibility(&mut geometry, [ClusterId(1)].into_iter().collect());

        let mut records = geometry.nodes.as_ref().unwrap().records().to_vec();
        records.push(node(4, 3, Some(2001)));
        geometry.set_nodes(NodeGeometry::new(records, &GeometrySettings::default()));

        engine.update_year_visibility(&mut geometry, 1990, 2020);
        assert_eq!(engine.node_cluster_visibility(), &[1.0; 5]);
        assert_eq!(engine.node_year_visibility(), &[1.0, 1.0, 1.0, 0.0, 1.0]);
        assert!(engine.selection().is_unfiltered());

        // The cluster filter is gone from the edges too, not only the nodes.
        assert_eq!(engine.edge_cluster_visibility(), &[1.0; 6]);
        assert_eq!(engine.stats(&geometry).visible_edges, 2);
        assert_eq!(engine.latest_stats(), engine.stats(&geometry));
    }

    #[test]
    fn either_endpoint_policy_keeps_cross_cluster_edges() {
        let (mut engine, mut geometry) = initialised();
        let selection: ClusterSelection = [ClusterId(1)].into_iter().collect();
        engine.update_cluster_visibility(&mut geometry, selection);
        assert_eq!(engine.stats(&geometry).visible_edges, 1);

        engine.set_edge_cluster_policy(&mut geometry, EdgeClusterPolicy::EitherEndpoint);
        assert_eq!(engine.stats(&geometry).visible_edges, 2);
    }

    #[test]
    fn latest_stats_follow_each_apply() {
        let (mut engine, mut geometry) = initialised();
        assert_eq!(engine.latest_stats().visible_nodes, 4);

        engine.update_year_visibility(&mut geometry, 2000, 2000);
        assert_eq!(engine.latest_stats(), engine.stats(&geometry));
        assert_eq!(engine.latest_stats().visible_nodes, 1);
        assert_eq!(engine.latest_stats().visible_edges, 1);
    }

    #[test]
    fn clear_filters_restores_everything() {
        let (mut engine, mut geometry) = initialised();
        engine.update_year_visibility(&mut geometry, 2100, 2200);
        assert_eq!(engine.stats(&geometry).visible_nodes, 0);

        engine.clear_filters(&mut geometry);
        let stats = engine.stats(&geometry);
        assert_eq!(stats.visible_nodes, 4);
        assert_eq!(stats.visible_edges, 2);
        assert_eq!(engine.year_range(), None);
    }
}
