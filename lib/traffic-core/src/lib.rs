//! Cluster load assignment registry and endpoint selection
//!
//! This library provides:
//! - Thread-safe registry of the latest endpoint assignment per cluster
//! - Weighted random endpoint selection with a health filter
//! - Plain endpoint records, free of any wire format

pub mod config;
pub mod endpoint;
pub mod error;
pub mod registry;
pub mod selector;

pub use config::SelectorConfig;
pub use endpoint::{ClusterAssignment, Endpoint, HealthStatus, Locality, LocalityGroup};
pub use error::{CoreError, Result};
pub use registry::ClusterRegistry;
pub use selector::Selector;
