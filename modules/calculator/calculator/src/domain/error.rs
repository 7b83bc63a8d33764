use calculator_sdk::{CalculatorError, UnknownOperation};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{function}({operand}) is outside the domain: {reason}")]
    OutOfDomain {
        function: &'static str,
        operand: f64,
        reason: &'static str,
    },

    #[error("Unknown operation '{name}'")]
    UnknownOperation { name: String },

    #[error("History storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn out_of_domain(function: &'static str, operand: f64, reason: &'static str) -> Self {
        Self::OutOfDomain {
            function,
            operand,
            reason,
        }
    }

    /// Operand problems are expected user errors; the rest are service faults.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<UnknownOperation> for DomainError {
    fn from(e: UnknownOperation) -> Self {
        Self::UnknownOperation { name: e.0 }
    }
}

impl From<DomainError> for CalculatorError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput { message } => Self::InvalidInput { message },
            DomainError::DivisionByZero => Self::DivisionByZero,
            DomainError::OutOfDomain {
                function, operand, ..
            } => Self::out_of_domain(function, operand),
            DomainError::UnknownOperation { name } => Self::UnknownOperation { name },
            DomainError::Storage(err) => Self::internal(format!("{err:#}")),
        }
    }
}
