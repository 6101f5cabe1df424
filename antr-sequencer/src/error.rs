use antr_core::{CapabilityError, ConfigurationError};
use thiserror::Error;

/// Anything that ends a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("failed to persist results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
