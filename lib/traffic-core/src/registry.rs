//! Assignment registry keyed by cluster name

use crate::{ClusterAssignment, CoreError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// ClusterRegistry holds the latest accepted assignment for every cluster
/// the discovery client has reported.
///
/// Assignments are stored behind `Arc` and swapped as whole values, so a
/// reader holding a snapshot never sees a half-applied update. Clusters are
/// never removed once seen.
pub struct ClusterRegistry {
    clusters: RwLock<HashMap<String, Arc<ClusterAssignment>>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self {
            clusters: RwLock::new(HashMap::new()),
        }
    }

    /// Record an assignment update for `cluster`.
    ///
    /// The first update for a cluster is stored as given, with `None`
    /// becoming the known-but-empty marker. Once the cluster is known, `None`
    /// or an assignment with no endpoints is ignored so a transient empty
    /// discovery response cannot wipe good routing data.
    pub fn set(&self, cluster: &str, assignment: Option<ClusterAssignment>) {
        // The map is only mutated by single inserts, so a poisoned lock still
        // guards a consistent map.
        let mut clusters = self.clusters.write().unwrap_or_else(PoisonError::into_inner);

        if !clusters.contains_key(cluster) {
            let assignment = assignment.unwrap_or_default();
            debug!(
                "Registered cluster {} with {} endpoints",
                cluster,
                assignment.endpoint_count()
            );
            clusters.insert(cluster.to_string(), Arc::new(assignment));
            return;
        }

        match assignment.filter(|a| !a.is_empty()) {
            Some(assignment) => {
                debug!(
                    "Updated assignment for cluster {}: {} endpoints",
                    cluster,
                    assignment.endpoint_count()
                );
                clusters.insert(cluster.to_string(), Arc::new(assignment));
            }
            None => {
                debug!("Ignored empty update for known cluster {}", cluster);
            }
        }
    }

    /// Snapshot of the current assignment for `cluster`
    pub fn get(&self, cluster: &str) -> Result<Arc<ClusterAssignment>> {
        let clusters = self.clusters.read().unwrap_or_else(PoisonError::into_inner);
        clusters
            .get(cluster)
            .cloned()
            .ok_or_else(|| CoreError::ClusterNotFound(cluster.to_string()))
    }

    pub fn contains(&self, cluster: &str) -> bool {
        let clusters = self.clusters.read().unwrap_or_else(PoisonError::into_inner);
        clusters.contains_key(cluster)
    }

    /// Names of every known cluster, sorted
    pub fn list_clusters(&self) -> Vec<String> {
        let clusters = self.clusters.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = clusters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get count of known clusters
    pub fn len(&self) -> usize {
        let clusters = self.clusters.read().unwrap_or_else(PoisonError::into_inner);
        clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
