//! Error types for the kernel core

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the kernel core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Malformed or truncated message payload
    #[error("Deserialization error: {reason}")]
    Deserialization {
        /// Reason the payload could not be parsed
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Neuron index outside of a population
    #[error("Neuron index {index} out of range (population size: {size})")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of neurons in the population
        size: usize,
    },
}

impl CoreError {
    /// Create a deserialization error
    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::Deserialization {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

/// Reject `value` unless it is finite and strictly positive
pub(crate) fn require_positive(parameter: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::invalid_parameter(parameter, value.to_string(), "finite and > 0.0"))
    }
}
