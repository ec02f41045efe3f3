//! Weighted random endpoint selection over registry snapshots

use crate::{ClusterRegistry, Locality, Result, SelectorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Source of uniform draws, safe to share between threads
enum RandomSource {
    /// Per-thread OS-seeded generator
    Thread,
    /// One seeded generator shared behind a lock
    Seeded(Mutex<StdRng>),
}

impl RandomSource {
    fn from_config(config: &SelectorConfig) -> Self {
        match config.seed {
            Some(seed) => RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
            None => RandomSource::Thread,
        }
    }

    /// Uniform draw from `[0, bound)`. `bound` must be non-zero.
    fn below(&self, bound: u64) -> u64 {
        match self {
            RandomSource::Thread => rand::thread_rng().gen_range(0..bound),
            RandomSource::Seeded(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(0..bound),
        }
    }
}

/// Selector picks endpoints for a cluster from the current registry state
pub struct Selector {
    registry: Arc<ClusterRegistry>,
    rng: RandomSource,
    ignore_health: bool,
}

impl Selector {
    /// Create a selector drawing from the per-thread generator
    pub fn new(registry: Arc<ClusterRegistry>) -> Self {
        Self::with_config(registry, SelectorConfig::default())
    }

    pub fn with_config(registry: Arc<ClusterRegistry>, config: SelectorConfig) -> Self {
        Self {
            rng: RandomSource::from_config(&config),
            ignore_health: config.ignore_health,
            registry,
        }
    }

    /// Pick one endpoint of `cluster` by weighted random draw.
    ///
    /// Returns `Err(ClusterNotFound)` for a cluster that was never set and
    /// `Ok(None)` when the cluster is known but has no eligible endpoint.
    /// If every eligible endpoint has weight 0 the draw is uniform; otherwise
    /// zero-weight endpoints are never picked. `locality` is accepted but
    /// does not affect the result.
    pub fn select(
        &self,
        cluster: &str,
        _locality: &[Locality],
        ignore_health: bool,
    ) -> Result<Option<SocketAddr>> {
        let assignment = self.registry.get(cluster)?;

        let (eligible, total_weight) = assignment
            .eligible(ignore_health)
            .fold((0u64, 0u64), |(count, total), e| {
                (count + 1, total + u64::from(e.weight))
            });

        if eligible == 0 {
            trace!("No eligible endpoint in cluster {}", cluster);
            return Ok(None);
        }

        if total_weight == 0 {
            let index = self.rng.below(eligible) as usize;
            let picked = assignment
                .eligible(ignore_health)
                .nth(index)
                .map(|e| e.address);
            trace!("Uniform pick in cluster {}: {:?}", cluster, picked);
            return Ok(picked);
        }

        // Cumulative walk over [1, total_weight]
        let mut remaining = self.rng.below(total_weight) + 1;
        for endpoint in assignment.eligible(ignore_health) {
            let weight = u64::from(endpoint.weight);
            if remaining <= weight {
                trace!("Weighted pick in cluster {}: {}", cluster, endpoint.address);
                return Ok(Some(endpoint.address));
            }
            remaining -= weight;
        }
        Ok(None)
    }

    /// Every eligible endpoint of `cluster` in stored order
    pub fn all(
        &self,
        cluster: &str,
        _locality: &[Locality],
        ignore_health: bool,
    ) -> Result<Vec<SocketAddr>> {
        let assignment = self.registry.get(cluster)?;
        Ok(assignment
            .eligible(ignore_health)
            .map(|e| e.address)
            .collect())
    }

    /// `select` with the configured health policy and no locality filter
    pub fn pick(&self, cluster: &str) -> Result<Option<SocketAddr>> {
        self.select(cluster, &[], self.ignore_health)
    }

    /// `all` with the configured health policy and no locality filter
    pub fn pick_all(&self, cluster: &str) -> Result<Vec<SocketAddr>> {
        self.all(cluster, &[], self.ignore_health)
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &Arc<ClusterRegistry> {
        &self.registry
    }
}
