use std::sync::Arc;

use calculator_sdk::{AngleUnit, BinaryOp, HistoryEntry, Operation, UnaryFn};
use chrono::Utc;
use tracing::{debug, error, info, instrument};

use super::error::DomainError;
use super::ops;
use super::repo::HistoryRepository;

// ============================================================================
// Service Configuration
// ============================================================================

pub struct ServiceConfig {
    /// Decimal places kept in trigonometric results.
    pub trig_decimals: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { trig_decimals: 10 }
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

pub struct Service<R: HistoryRepository> {
    repo: Arc<R>,
    config: ServiceConfig,
}

impl<R: HistoryRepository> Service<R> {
    #[must_use]
    pub fn new(repo: Arc<R>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// # Errors
    /// Domain failures from [`ops::binary`] or a history storage failure.
    #[instrument(skip(self), fields(op = %op))]
    pub async fn evaluate_binary(&self, op: BinaryOp, a: f64, b: f64) -> Result<f64, DomainError> {
        let result = ops::binary(op, a, b).inspect_err(log_failure)?;
        self.record(op.into(), vec![a, b], result, None).await?;
        Ok(result)
    }

    /// # Errors
    /// Domain failures from [`ops::unary`] or a history storage failure.
    #[instrument(skip(self), fields(function = %function, unit = %unit))]
    pub async fn evaluate_unary(
        &self,
        function: UnaryFn,
        x: f64,
        unit: AngleUnit,
    ) -> Result<f64, DomainError> {
        let result =
            ops::unary(function, x, unit, self.config.trig_decimals).inspect_err(log_failure)?;
        let unit = function.uses_angle_unit().then_some(unit);
        self.record(function.into(), vec![x], result, unit).await?;
        Ok(result)
    }

    /// # Errors
    /// History storage failure.
    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<f64, DomainError> {
        let result: f64 = rand::random();
        self.record(Operation::Random, Vec::new(), result, None)
            .await?;
        Ok(result)
    }

    /// # Errors
    /// History storage failure.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, DomainError> {
        self.repo
            .list()
            .await
            .inspect_err(|e| error!(error = %e, "failed to read history"))
            .map_err(DomainError::from)
    }

    /// # Errors
    /// History storage failure.
    #[instrument(skip(self))]
    pub async fn clear_history(&self) -> Result<(), DomainError> {
        self.repo
            .clear()
            .await
            .inspect_err(|e| error!(error = %e, "failed to clear history"))?;
        info!("history cleared");
        Ok(())
    }

    async fn record(
        &self,
        operation: Operation,
        operands: Vec<f64>,
        result: f64,
        unit: Option<AngleUnit>,
    ) -> Result<(), DomainError> {
        let entry = HistoryEntry {
            operation,
            operands,
            result,
            unit,
            recorded_at: Utc::now(),
        };
        self.repo
            .append(entry)
            .await
            .inspect_err(|e| error!(error = %e, %operation, "failed to record history"))?;
        debug!(%operation, result, "operation recorded");
        Ok(())
    }
}

fn log_failure(e: &DomainError) {
    debug!(error = %e, "operation rejected");
}
