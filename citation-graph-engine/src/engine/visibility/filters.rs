use std::collections::HashSet;

use constants::visibility::{DEFAULT_FROM_YEAR, DEFAULT_TO_YEAR, TIME_TRAVEL_YEARS_PER_SECOND};
use serde::{Deserialize, Serialize};

use crate::engine::geometry::ClusterId;

/// Inclusive publication year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }
}

/// Which edges survive a cluster selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClusterPolicy {
    /// Both endpoint clusters must be selected; no dangling edges.
    #[default]
    BothEndpoints,
    /// Either endpoint's cluster being selected is enough.
    EitherEndpoint,
}

/// Set of selected clusters. Empty means "no filter": everything passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSelection(HashSet<ClusterId>);

impl ClusterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, cluster: ClusterId) -> bool {
        self.0.contains(&cluster)
    }

    /// Unclustered nodes only pass when no filter is active.
    pub fn admits(&self, cluster: Option<ClusterId>) -> bool {
        self.is_unfiltered() || cluster.is_some_and(|c| self.0.contains(&c))
    }

    pub fn admits_edge(
        &self,
        source: Option<ClusterId>,
        target: Option<ClusterId>,
        policy: EdgeClusterPolicy,
    ) -> bool {
        if self.is_unfiltered() {
            return true;
        }
        match policy {
            EdgeClusterPolicy::BothEndpoints => self.admits(source) && self.admits(target),
            EdgeClusterPolicy::EitherEndpoint => self.admits(source) || self.admits(target),
        }
    }
}

impl FromIterator<ClusterId> for ClusterSelection {
    fn from_iter<I: IntoIterator<Item = ClusterId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Visibility tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    pub default_from_year: i32,
    pub default_to_year: i32,
    pub edge_cluster_policy: EdgeClusterPolicy,
    pub time_travel_years_per_second: f32,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            default_from_year: DEFAULT_FROM_YEAR,
            default_to_year: DEFAULT_TO_YEAR,
            edge_cluster_policy: EdgeClusterPolicy::BothEndpoints,
            time_travel_years_per_second: TIME_TRAVEL_YEARS_PER_SECOND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_is_inclusive() {
        let range = YearRange::new(2000, 2010);
        assert!(range.contains(2000));
        assert!(range.contains(2010));
        assert!(!range.contains(1999));
        assert!(!range.contains(2011));
    }

    #[test]
    fn empty_selection_admits_everything() {
        let selection = ClusterSelection::all();
        assert!(selection.admits(None));
        assert!(selection.admits(Some(ClusterId(7))));
        assert!(selection.admits_edge(None, Some(ClusterId(1)), EdgeClusterPolicy::BothEndpoints));
    }

    #[test]
    fn edge_policies_differ_on_cross_cluster_edges() {
        let selection: ClusterSelection = [ClusterId(1)].into_iter().collect();
        let (a, b) = (Some(ClusterId(1)), Some(ClusterId(2)));
        assert!(!selection.admits_edge(a, b, EdgeClusterPolicy::BothEndpoints));
        assert!(selection.admits_edge(a, b, EdgeClusterPolicy::EitherEndpoint));
        assert!(selection.admits_edge(a, a, EdgeClusterPolicy::BothEndpoints));
        assert!(!selection.admits_edge(b, b, EdgeClusterPolicy::EitherEndpoint));
    }

    #[test]
    fn settings_accept_partial_json() {
        let settings: VisibilitySettings =
            serde_json::from_str(r#"{"edge_cluster_policy": "either_endpoint"}"#).unwrap();
        assert_eq!(settings.edge_cluster_policy, EdgeClusterPolicy::EitherEndpoint);
        assert_eq!(settings.default_from_year, DEFAULT_FROM_YEAR);
    }
}
