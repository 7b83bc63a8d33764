//! Error types for the calculator SDK.

use std::time::Duration;

use thiserror::Error;

use crate::models::UnknownOperation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{function}({operand}) is outside the domain of {function}")]
    OutOfDomain { function: String, operand: f64 },

    #[error("Unknown operation '{name}'")]
    UnknownOperation { name: String },

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalculatorError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn out_of_domain(function: impl Into<String>, operand: f64) -> Self {
        Self::OutOfDomain {
            function: function.into(),
            operand,
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures caused by the operands rather than by the service.
    #[must_use]
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::DivisionByZero | Self::OutOfDomain { .. }
        )
    }
}

impl From<UnknownOperation> for CalculatorError {
    fn from(err: UnknownOperation) -> Self {
        Self::UnknownOperation { name: err.0 }
    }
}
