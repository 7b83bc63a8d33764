#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;

use async_trait::async_trait;
use calculator_sdk::{
    AngleUnit, BinaryOp, CalculatorClient, CalculatorError, HistoryEntry, Operation, UnaryFn,
};

use super::error::DomainError;
use super::local_client::LocalClient;
use super::repo::HistoryRepository;
use super::service::{Service, ServiceConfig};
use crate::infra::memory::InMemoryHistory;

fn service() -> (Arc<Service<InMemoryHistory>>, Arc<InMemoryHistory>) {
    let repo = Arc::new(InMemoryHistory::default());
    let svc = Arc::new(Service::new(repo.clone(), ServiceConfig::default()));
    (svc, repo)
}

struct BrokenRepository;

#[async_trait]
impl HistoryRepository for BrokenRepository {
    async fn append(&self, _entry: HistoryEntry) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    async fn list(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        anyhow::bail!("disk full")
    }

    async fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[tokio::test]
async fn successful_operation_appends_one_entry() {
    let (svc, repo) = service();

    let result = svc.evaluate_binary(BinaryOp::Add, 5.0, 3.0).await.unwrap();
    assert_eq!(result, 8.0);

    let history = svc.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].operation, Operation::Binary(BinaryOp::Add));
    assert_eq!(history[0].operands, vec![5.0, 3.0]);
    assert_eq!(history[0].result, 8.0);
    assert_eq!(history[0].unit, None);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn failed_operation_records_nothing() {
    let (svc, repo) = service();

    let err = svc
        .evaluate_binary(BinaryOp::Divide, 1.0, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DivisionByZero));

    let err = svc
        .evaluate_unary(UnaryFn::Sqrt, -1.0, AngleUnit::Deg)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::OutOfDomain { .. }));
    assert!(repo.is_empty());
}

#[tokio::test]
async fn unit_is_recorded_for_trig_only() {
    let (svc, _repo) = service();

    svc.evaluate_unary(UnaryFn::Sin, 30.0, AngleUnit::Deg)
        .await
        .unwrap();
    svc.evaluate_unary(UnaryFn::Sqrt, 9.0, AngleUnit::Rad)
        .await
        .unwrap();
    svc.evaluate_unary(UnaryFn::Atan, 1.0, AngleUnit::Rad)
        .await
        .unwrap();

    let units: Vec<_> = svc
        .history()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.unit)
        .collect();
    assert_eq!(
        units,
        vec![Some(AngleUnit::Deg), None, Some(AngleUnit::Rad)]
    );
}

#[tokio::test]
async fn random_is_recorded_without_operands() {
    let (svc, _repo) = service();

    let value = svc.random().await.unwrap();
    assert!((0.0..1.0).contains(&value));

    let history = svc.history().await.unwrap();
    assert_eq!(history[0].operation, Operation::Random);
    assert!(history[0].operands.is_empty());
    assert_eq!(history[0].result, value);
}

#[tokio::test]
async fn clear_then_fetch_is_empty() {
    let (svc, _repo) = service();

    svc.evaluate_binary(BinaryOp::Power, 2.0, 3.0).await.unwrap();
    svc.clear_history().await.unwrap();
    assert!(svc.history().await.unwrap().is_empty());

    svc.evaluate_binary(BinaryOp::Subtract, 2.0, 3.0)
        .await
        .unwrap();
    let history = svc.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result, -1.0);
}

#[tokio::test]
async fn history_keeps_insertion_order() {
    let (svc, _repo) = service();

    for (i, op) in BinaryOp::ALL.into_iter().enumerate() {
        let b = f64::from(u8::try_from(i).unwrap() + 1);
        svc.evaluate_binary(op, 10.0, b).await.unwrap();
    }

    let ops: Vec<_> = svc
        .history()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.operation)
        .collect();
    let expected: Vec<_> = BinaryOp::ALL.into_iter().map(Operation::from).collect();
    assert_eq!(ops, expected);
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_error() {
    let svc = Service::new(Arc::new(BrokenRepository), ServiceConfig::default());

    let err = svc
        .evaluate_binary(BinaryOp::Add, 1.0, 1.0)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Storage(_)));
    assert!(!err.is_user_error());
    assert!(matches!(
        svc.history().await.unwrap_err(),
        DomainError::Storage(_)
    ));
}

#[tokio::test]
async fn local_client_maps_domain_errors() {
    let (svc, _repo) = service();
    let client = LocalClient::new(svc);

    assert_eq!(
        client
            .evaluate_unary(UnaryFn::Asin, 1.0, AngleUnit::Deg)
            .await
            .unwrap(),
        90.0
    );
    assert_eq!(
        client
            .evaluate_unary(UnaryFn::Asin, 2.0, AngleUnit::Deg)
            .await
            .unwrap_err(),
        CalculatorError::out_of_domain("asin", 2.0)
    );
    assert_eq!(
        client
            .evaluate_binary(BinaryOp::Divide, 1.0, 0.0)
            .await
            .unwrap_err(),
        CalculatorError::DivisionByZero
    );
    assert_eq!(client.get_history().await.unwrap().len(), 1);
    client.clear_history().await.unwrap();
    assert!(client.get_history().await.unwrap().is_empty());
}
