//! Endpoint and cluster assignment records
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Health classification reported for an endpoint by the control plane
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
    Draining,
    Timeout,
    Degraded,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }
}

/// A single addressable backend of a cluster
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: SocketAddr,
    /// Relative selection weight; 0 means unweighted
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub health: HealthStatus,
}

impl Endpoint {
    pub fn new(address: SocketAddr, weight: u32, health: HealthStatus) -> Self {
        Self {
            address,
            weight,
            health,
        }
    }

    /// Whether the endpoint may be selected under the given health policy
    pub fn is_eligible(&self, ignore_health: bool) -> bool {
        ignore_health || self.health.is_healthy()
    }
}

/// Opaque locality tag. Carried through, never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locality {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub sub_zone: String,
}

/// Endpoints sharing one locality, in the order the control plane sent them
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityGroup {
    #[serde(default)]
    pub locality: Locality,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl LocalityGroup {
    pub fn new(locality: Locality, endpoints: Vec<Endpoint>) -> Self {
        Self {
            locality,
            endpoints,
        }
    }
}

/// The full endpoint set known for one cluster at a point in time.
///
/// An assignment with no groups doubles as the "known but empty" marker
/// stored for clusters that have been seen without any payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    #[serde(default)]
    pub groups: Vec<LocalityGroup>,
}

impl ClusterAssignment {
    pub fn new(groups: Vec<LocalityGroup>) -> Self {
        Self { groups }
    }

    /// Iterate every endpoint across all groups in stored order
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.groups.iter().flat_map(|g| g.endpoints.iter())
    }

    /// Iterate endpoints that pass the health filter, in stored order
    pub fn eligible(&self, ignore_health: bool) -> impl Iterator<Item = &Endpoint> {
        self.endpoints().filter(move |e| e.is_eligible(ignore_health))
    }

    pub fn endpoint_count(&self) -> usize {
        self.groups.iter().map(|g| g.endpoints.len()).sum()
    }

    /// True when there is not a single endpoint in any group
    pub fn is_empty(&self) -> bool {
        self.endpoint_count() == 0
    }
}
