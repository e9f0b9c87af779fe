//! Runtime error types.

use parley_core::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while wiring up a Parley application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configured store could not be opened.
    #[error("Failed to open state store: {0}")]
    Store(#[from] StoreError),

    /// The configured backend was compiled out.
    #[error("State backend '{backend}' requires the '{feature}' feature")]
    BackendDisabled {
        backend: &'static str,
        feature: &'static str,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
