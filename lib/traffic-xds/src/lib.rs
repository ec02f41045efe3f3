//! xDS ingestion adapter
//!
//! Decodes Envoy `ClusterLoadAssignment` documents and converts them into
//! `traffic_core` records before they reach the registry.
pub mod convert;
pub mod error;
pub mod model;

pub use convert::{apply, decode_json, decode_yaml};
pub use error::{Result, XdsError};
pub use model::ClusterLoadAssignment;
