use async_trait::async_trait;
use calculator_sdk::{
    AngleUnit, BinaryOp, CalculatorClient, CalculatorError, HistoryEntry, UnaryFn,
};
use std::sync::Arc;

use crate::domain::repo::HistoryRepository;
use crate::domain::service::Service;

/// In-process [`CalculatorClient`] backed directly by the service.
pub struct LocalClient<R: HistoryRepository + 'static> {
    service: Arc<Service<R>>,
}

impl<R: HistoryRepository + 'static> LocalClient<R> {
    #[must_use]
    pub fn new(service: Arc<Service<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R: HistoryRepository + 'static> CalculatorClient for LocalClient<R> {
    async fn evaluate_binary(&self, op: BinaryOp, a: f64, b: f64) -> Result<f64, CalculatorError> {
        self.service
            .evaluate_binary(op, a, b)
            .await
            .map_err(Into::into)
    }

    async fn evaluate_unary(
        &self,
        function: UnaryFn,
        x: f64,
        unit: AngleUnit,
    ) -> Result<f64, CalculatorError> {
        self.service
            .evaluate_unary(function, x, unit)
            .await
            .map_err(Into::into)
    }

    async fn random(&self) -> Result<f64, CalculatorError> {
        self.service.random().await.map_err(Into::into)
    }

    async fn get_history(&self) -> Result<Vec<HistoryEntry>, CalculatorError> {
        self.service.history().await.map_err(Into::into)
    }

    async fn clear_history(&self) -> Result<(), CalculatorError> {
        self.service.clear_history().await.map_err(Into::into)
    }
}
