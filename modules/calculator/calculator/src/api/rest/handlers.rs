use std::sync::Arc;

use axum::extract::{Extension, OriginalUri, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use calculator_sdk::{AngleUnit, BinaryOp, UnaryFn};

use crate::domain::error::DomainError;
use crate::domain::ops;
use crate::domain::repo::HistoryRepository;
use crate::domain::service::Service;

use super::dto::{BinaryQuery, HistoryEntryDto, ResultDto, UnaryQuery};
use super::error::{ApiResult, domain_error_to_problem};

pub async fn evaluate_binary<R: HistoryRepository + 'static>(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service<R>>>,
    Path(op): Path<String>,
    Query(query): Query<BinaryQuery>,
) -> ApiResult<Json<ResultDto>> {
    binary(&svc, &op, &query)
        .await
        .map(|result| Json(result.into()))
        .map_err(|e| domain_error_to_problem(&e, uri.path()))
}

pub async fn evaluate_unary<R: HistoryRepository + 'static>(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service<R>>>,
    Path((function, x)): Path<(String, String)>,
    Query(query): Query<UnaryQuery>,
) -> ApiResult<Json<ResultDto>> {
    unary(&svc, &function, &x, &query)
        .await
        .map(|result| Json(result.into()))
        .map_err(|e| domain_error_to_problem(&e, uri.path()))
}

pub async fn random<R: HistoryRepository + 'static>(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service<R>>>,
) -> ApiResult<Json<ResultDto>> {
    svc.random()
        .await
        .map(|result| Json(result.into()))
        .map_err(|e| domain_error_to_problem(&e, uri.path()))
}

pub async fn list_history<R: HistoryRepository + 'static>(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service<R>>>,
) -> ApiResult<Json<Vec<HistoryEntryDto>>> {
    let entries = svc
        .history()
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub async fn clear_history<R: HistoryRepository + 'static>(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<Service<R>>>,
) -> ApiResult<StatusCode> {
    svc.clear_history()
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn binary<R: HistoryRepository>(
    svc: &Service<R>,
    op: &str,
    query: &BinaryQuery,
) -> Result<f64, DomainError> {
    let op: BinaryOp = op.parse()?;
    let a = ops::parse_operand("a", query.a.as_deref())?;
    let b = ops::parse_operand("b", query.b.as_deref())?;
    svc.evaluate_binary(op, a, b).await
}

async fn unary<R: HistoryRepository>(
    svc: &Service<R>,
    function: &str,
    x: &str,
    query: &UnaryQuery,
) -> Result<f64, DomainError> {
    let function: UnaryFn = function.parse()?;
    let x = ops::parse_operand("x", Some(x))?;
    let unit = match query.unit.as_deref() {
        None => AngleUnit::default(),
        Some(raw) => raw.parse().map_err(DomainError::invalid_input)?,
    };
    svc.evaluate_unary(function, x, unit).await
}
