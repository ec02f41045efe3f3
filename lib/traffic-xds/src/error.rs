use thiserror::Error;

pub type Result<T> = std::result::Result<T, XdsError>;

#[derive(Error, Debug)]
pub enum XdsError {
    #[error("Endpoint has no socket address")]
    MissingAddress,

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(u32),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML decode error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
