//! Control-plane error types

use thiserror::Error;

/// Errors surfaced by control-plane capability implementations.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("stack operation failed: {0}")]
    StackOperation(String),

    #[error("roleset operation failed: {0}")]
    RolesetOperation(String),

    #[error("image lookup failed: {0}")]
    ImageLookup(String),

    #[error("availability zone lookup failed: {0}")]
    AvailabilityZones(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
