//! Error types for the step backends

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while loading or stepping a backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Kernel core error
    #[error("Core error: {source}")]
    Core {
        #[from]
        /// Source core error
        source: snnk_core::CoreError,
    },

    /// Neuron or synapse model not supported by this backend
    #[error("Model {model} is not supported by backend {backend}")]
    UnsupportedModel {
        /// Model name
        model: String,
        /// Backend name
        backend: String,
    },

    /// Backend could not be loaded
    #[error("Failed to load backend {name}: {reason}")]
    Load {
        /// Requested backend name
        name: String,
        /// Reason for the failure
        reason: String,
    },

    /// Entities loaded after the first step
    #[error("Network is sealed after step {step}: entities cannot be loaded")]
    NetworkSealed {
        /// Step count at the time of the load attempt
        step: u64,
    },

    /// Invalid backend configuration
    #[error("Invalid backend configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Worker pool could not be built
    #[error("Thread pool error: {reason}")]
    ThreadPool {
        /// Reason reported by the pool builder
        reason: String,
    },
}

impl BackendError {
    /// Create an unsupported model error
    pub fn unsupported_model(model: impl Into<String>, backend: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            model: model.into(),
            backend: backend.into(),
        }
    }

    /// Create a load error
    pub fn load(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
