//! Wire shapes of the Envoy EDS `ClusterLoadAssignment` resource
//!
//! Field names follow the proto definitions. Both the snake_case form used in
//! YAML configs and the camelCase proto3 JSON form are accepted.

use crate::{Result, XdsError};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClusterLoadAssignment {
    #[serde(default, alias = "clusterName")]
    pub cluster_name: String,
    #[serde(default)]
    pub endpoints: Vec<LocalityLbEndpoints>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LocalityLbEndpoints {
    #[serde(default)]
    pub locality: Option<Locality>,
    #[serde(default, alias = "lbEndpoints")]
    pub lb_endpoints: Vec<LbEndpoint>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Locality {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default, alias = "subZone")]
    pub sub_zone: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LbEndpoint {
    #[serde(default)]
    pub endpoint: Option<EndpointSpec>,
    #[serde(default, alias = "healthStatus")]
    pub health_status: HealthStatus,
    #[serde(default, alias = "loadBalancingWeight")]
    pub load_balancing_weight: Option<Weight>,
}

impl LbEndpoint {
    pub fn socket_address(&self) -> Option<&SocketAddress> {
        self.endpoint
            .as_ref()?
            .address
            .as_ref()?
            .socket_address
            .as_ref()
    }

    /// Weight value, 0 when unset
    pub fn weight(&self) -> u32 {
        self.load_balancing_weight.map(Weight::value).unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EndpointSpec {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Address {
    #[serde(default, alias = "socketAddress")]
    pub socket_address: Option<SocketAddress>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SocketAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default, alias = "portValue")]
    pub port_value: u32,
}

impl SocketAddress {
    /// Parsed IP address
    pub fn ip(&self) -> Result<IpAddr> {
        self.address
            .parse()
            .map_err(|_| XdsError::InvalidAddress(self.address.clone()))
    }

    /// Port, rejected when it does not fit in 16 bits
    pub fn port(&self) -> Result<u16> {
        u16::try_from(self.port_value).map_err(|_| XdsError::InvalidPort(self.port_value))
    }
}

/// `google.protobuf.UInt32Value`, written either bare or as `{ value: n }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Bare(u32),
    Wrapped { value: u32 },
}

impl Weight {
    pub fn value(self) -> u32 {
        match self {
            Weight::Bare(value) | Weight::Wrapped { value } => value,
        }
    }
}

/// `envoy.config.core.v3.HealthStatus`, written as its name or its number
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
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
    const NAMES: &'static [&'static str] =
        &["UNKNOWN", "HEALTHY", "UNHEALTHY", "DRAINING", "TIMEOUT", "DEGRADED"];

    pub fn from_number(number: u64) -> Option<Self> {
        match number {
            0 => Some(HealthStatus::Unknown),
            1 => Some(HealthStatus::Healthy),
            2 => Some(HealthStatus::Unhealthy),
            3 => Some(HealthStatus::Draining),
            4 => Some(HealthStatus::Timeout),
            5 => Some(HealthStatus::Degraded),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| Self::from_number(i as u64))
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HealthStatusVisitor;

        impl<'de> Visitor<'de> for HealthStatusVisitor {
            type Value = HealthStatus;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a health status name or number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<HealthStatus, E> {
                HealthStatus::from_name(value)
                    .ok_or_else(|| E::unknown_variant(value, HealthStatus::NAMES))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<HealthStatus, E> {
                HealthStatus::from_number(value).ok_or_else(|| {
                    E::invalid_value(de::Unexpected::Unsigned(value), &"a number from 0 to 5")
                })
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<HealthStatus, E> {
                u64::try_from(value)
                    .ok()
                    .and_then(HealthStatus::from_number)
                    .ok_or_else(|| {
                        E::invalid_value(de::Unexpected::Signed(value), &"a number from 0 to 5")
                    })
            }
        }

        deserializer.deserialize_any(HealthStatusVisitor)
    }
}
