//! `CalculatorClient` trait definition.
//!
//! Implemented in-process by the calculator module and over HTTP by
//! [`RestCalculatorClient`](crate::RestCalculatorClient).

use async_trait::async_trait;

use crate::errors::CalculatorError;
use crate::models::{AngleUnit, BinaryOp, HistoryEntry, UnaryFn};

/// Public API of the operation service.
///
/// Every successful evaluation appends exactly one entry to the shared history.
#[async_trait]
pub trait CalculatorClient: Send + Sync {
    /// Apply a binary operator to `a` and `b`.
    async fn evaluate_binary(&self, op: BinaryOp, a: f64, b: f64) -> Result<f64, CalculatorError>;

    /// Apply a unary function to `x`.
    ///
    /// `unit` is honored by trigonometric and inverse trigonometric functions
    /// and ignored by the rest.
    async fn evaluate_unary(
        &self,
        function: UnaryFn,
        x: f64,
        unit: AngleUnit,
    ) -> Result<f64, CalculatorError>;

    /// Uniform random number in `[0, 1)`.
    async fn random(&self) -> Result<f64, CalculatorError>;

    /// Full history, oldest first.
    async fn get_history(&self) -> Result<Vec<HistoryEntry>, CalculatorError>;

    /// Drop every history entry.
    async fn clear_history(&self) -> Result<(), CalculatorError>;
}
