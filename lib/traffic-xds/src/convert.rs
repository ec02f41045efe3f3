//! Conversion of decoded xDS resources into registry records

use crate::model::{self, ClusterLoadAssignment};
use crate::{Result, XdsError};
use std::net::SocketAddr;
use traffic_core::{
    ClusterAssignment, ClusterRegistry, Endpoint, HealthStatus, Locality, LocalityGroup,
};
use tracing::{debug, warn};

impl From<model::HealthStatus> for HealthStatus {
    fn from(status: model::HealthStatus) -> Self {
        match status {
            model::HealthStatus::Unknown => HealthStatus::Unknown,
            model::HealthStatus::Healthy => HealthStatus::Healthy,
            model::HealthStatus::Unhealthy => HealthStatus::Unhealthy,
            model::HealthStatus::Draining => HealthStatus::Draining,
            model::HealthStatus::Timeout => HealthStatus::Timeout,
            model::HealthStatus::Degraded => HealthStatus::Degraded,
        }
    }
}

impl From<model::Locality> for Locality {
    fn from(locality: model::Locality) -> Self {
        Locality {
            region: locality.region,
            zone: locality.zone,
            sub_zone: locality.sub_zone,
        }
    }
}

impl TryFrom<&model::LbEndpoint> for Endpoint {
    type Error = XdsError;

    fn try_from(lb: &model::LbEndpoint) -> Result<Self> {
        let socket = lb.socket_address().ok_or(XdsError::MissingAddress)?;
        let address = SocketAddr::new(socket.ip()?, socket.port()?);
        Ok(Endpoint::new(address, lb.weight(), lb.health_status.into()))
    }
}

impl TryFrom<ClusterLoadAssignment> for ClusterAssignment {
    type Error = XdsError;

    /// Fails on the first endpoint with an unusable address. One bad endpoint
    /// rejects the whole document, so through `apply` the cluster keeps its
    /// previous assignment rather than a partial one.
    fn try_from(cla: ClusterLoadAssignment) -> Result<Self> {
        let groups = cla
            .endpoints
            .into_iter()
            .map(|group| {
                let endpoints = group
                    .lb_endpoints
                    .iter()
                    .map(Endpoint::try_from)
                    .collect::<Result<Vec<_>>>()?;
                let locality = group.locality.map(Locality::from).unwrap_or_default();
                Ok(LocalityGroup::new(locality, endpoints))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ClusterAssignment::new(groups))
    }
}

pub fn decode_json(input: &str) -> Result<ClusterLoadAssignment> {
    Ok(serde_json::from_str(input)?)
}

pub fn decode_yaml(input: &str) -> Result<ClusterLoadAssignment> {
    Ok(serde_yaml::from_str(input)?)
}

/// Hand one discovery update for `cluster` to the registry.
///
/// `None` records that the cluster exists without data. A document that
/// fails conversion is rejected whole and the registry is left untouched.
pub fn apply(
    registry: &ClusterRegistry,
    cluster: &str,
    cla: Option<ClusterLoadAssignment>,
) -> Result<()> {
    let assignment = match cla {
        Some(cla) => match ClusterAssignment::try_from(cla) {
            Ok(assignment) => Some(assignment),
            Err(e) => {
                warn!("Rejected assignment for cluster {}: {}", cluster, e);
                return Err(e);
            }
        },
        None => None,
    };

    debug!("Applying update for cluster {}", cluster);
    registry.set(cluster, assignment);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use traffic_core::Selector;

    const SVC_A_YAML: &str = r#"
cluster_name: svc-a
endpoints:
  - locality:
      region: us-east-1
      zone: us-east-1a
    lb_endpoints:
      - endpoint:
          address:
            socket_address:
              address: 10.0.0.1
              port_value: 8080
        health_status: HEALTHY
        load_balancing_weight: 1
      - endpoint:
          address:
            socket_address:
              address: 10.0.0.2
              port_value: 8080
        health_status: UNHEALTHY
"#;

    #[test]
    fn test_decode_yaml_and_convert() {
        let cla = decode_yaml(SVC_A_YAML).unwrap();
        assert_eq!(cla.cluster_name, "svc-a");

        let assignment = ClusterAssignment::try_from(cla).unwrap();
        assert_eq!(assignment.groups.len(), 1);
        assert_eq!(assignment.groups[0].locality.zone, "us-east-1a");

        let endpoints: Vec<_> = assignment.endpoints().collect();
        assert_eq!(endpoints[0].address, "10.0.0.1:8080".parse().unwrap());
        assert_eq!(endpoints[0].weight, 1);
        assert_eq!(endpoints[0].health, HealthStatus::Healthy);
        assert_eq!(endpoints[1].weight, 0);
        assert_eq!(endpoints[1].health, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_decode_proto3_json() {
        let cla = decode_json(
            r#"{
                "clusterName": "svc-b",
                "endpoints": [{
                    "lbEndpoints": [{
                        "endpoint": {"address": {"socketAddress": {"address": "fd00::1", "portValue": 443}}},
                        "healthStatus": "HEALTHY",
                        "loadBalancingWeight": {"value": 7}
                    }]
                }]
            }"#,
        )
        .unwrap();
        let assignment = ClusterAssignment::try_from(cla).unwrap();
        let endpoint = assignment.endpoints().next().unwrap();
        assert_eq!(endpoint.address, "[fd00::1]:443".parse().unwrap());
        assert_eq!(endpoint.weight, 7);
        assert_eq!(assignment.groups[0].locality, Locality::default());
    }

    #[test]
    fn test_decode_rejects_malformed_document() {
        assert!(matches!(decode_json("{not json"), Err(XdsError::Json(_))));
    }

    #[test]
    fn test_apply_end_to_end() {
        let registry = Arc::new(ClusterRegistry::new());
        apply(&registry, "svc-a", Some(decode_yaml(SVC_A_YAML).unwrap())).unwrap();

        let selector = Selector::new(registry);
        let expected: SocketAddr = "10.0.0.1:8080".parse().unwrap();
        for _ in 0..50 {
            assert_eq!(selector.select("svc-a", &[], false).unwrap(), Some(expected));
        }
        assert_eq!(selector.all("svc-a", &[], false).unwrap(), vec![expected]);
    }

    #[test]
    fn test_one_bad_endpoint_keeps_previous_assignment() {
        let registry = ClusterRegistry::new();
        apply(&registry, "svc-a", Some(decode_yaml(SVC_A_YAML).unwrap())).unwrap();
        let before = registry.get("svc-a").unwrap();

        let mixed = decode_json(
            r#"{"endpoints": [{"lbEndpoints": [
                {"endpoint": {"address": {"socketAddress": {"address": "10.0.0.9", "portValue": 80}}},
                 "healthStatus": 1},
                {"endpoint": {"address": {"socketAddress": {"address": "10.0.0.300", "portValue": 80}}},
                 "healthStatus": 1}
            ]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            ClusterAssignment::try_from(mixed.clone()),
            Err(XdsError::InvalidAddress(_))
        ));
        assert!(apply(&registry, "svc-a", Some(mixed)).is_err());
        assert_eq!(registry.get("svc-a").unwrap(), before);
    }

    #[test]
    fn test_apply_numeric_health_status() {
        let registry = Arc::new(ClusterRegistry::new());
        let cla = decode_json(
            r#"{"clusterName": "svc-d", "endpoints": [{"lbEndpoints": [
                {"endpoint": {"address": {"socketAddress": {"address": "10.0.0.7", "portValue": 80}}},
                 "healthStatus": 1, "loadBalancingWeight": 2},
                {"endpoint": {"address": {"socketAddress": {"address": "10.0.0.8", "portValue": 80}}},
                 "healthStatus": 2, "loadBalancingWeight": 2}
            ]}]}"#,
        )
        .unwrap();
        apply(&registry, "svc-d", Some(cla)).unwrap();

        let selector = Selector::new(registry);
        let expected: SocketAddr = "10.0.0.7:80".parse().unwrap();
        assert_eq!(selector.all("svc-d", &[], false).unwrap(), vec![expected]);
    }

    #[test]
    fn test_apply_absent_registers_cluster() {
        let registry = ClusterRegistry::new();
        apply(&registry, "svc-c", None).unwrap();
        assert!(registry.get("svc-c").unwrap().is_empty());
    }

    #[test]
    fn test_apply_bad_address_leaves_registry_untouched() {
        let registry = ClusterRegistry::new();
        apply(&registry, "svc-a", Some(decode_yaml(SVC_A_YAML).unwrap())).unwrap();
        let before = registry.get("svc-a").unwrap();

        let bad = decode_json(
            r#"{"endpoints": [{"lb_endpoints": [
                {"endpoint": {"address": {"socket_address": {"address": "not-an-ip", "port_value": 80}}}}
            ]}]}"#,
        )
        .unwrap();
        let err = apply(&registry, "svc-a", Some(bad)).unwrap_err();
        assert!(matches!(err, XdsError::InvalidAddress(ref a) if a == "not-an-ip"));
        assert_eq!(registry.get("svc-a").unwrap(), before);

        let no_address =
            decode_json(r#"{"endpoints": [{"lb_endpoints": [{"health_status": "HEALTHY"}]}]}"#)
                .unwrap();
        let err = apply(&registry, "svc-new", Some(no_address)).unwrap_err();
        assert!(matches!(err, XdsError::MissingAddress));
        assert!(!registry.contains("svc-new"));
    }
}
