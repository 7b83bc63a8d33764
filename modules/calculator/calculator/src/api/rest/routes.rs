use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use utoipa::openapi::schema::Type;

use crate::api::rest::openapi::{OpenApiRegistry, OperationBuilder};
use crate::api::rest::{dto, handlers};
use crate::domain::repo::HistoryRepository;
use crate::domain::service::Service;

pub const API_TITLE: &str = "Calculator API";

const BINARY_PATH: &str = "/calculator/v1/binary/{op}";
const UNARY_PATH: &str = "/calculator/v1/unary/{function}/{x}";
const RANDOM_PATH: &str = "/calculator/v1/random";
const HISTORY_PATH: &str = "/calculator/v1/history";

/// Full calculator router: every operation plus `/openapi.json`.
pub fn router<R: HistoryRepository + 'static>(service: Arc<Service<R>>) -> Router {
    let mut registry = OpenApiRegistry::default();
    let router = register_routes::<R>(Router::new(), &mut registry);
    let doc = Arc::new(registry.build_openapi(API_TITLE, env!("CARGO_PKG_VERSION")));
    tracing::info!(
        operations = registry.operations().len(),
        "calculator routes registered"
    );

    router
        .route(
            "/openapi.json",
            get(move || {
                let doc = Arc::clone(&doc);
                async move { Json(doc.as_ref().clone()) }
            }),
        )
        .layer(Extension(service))
}

pub fn register_routes<R: HistoryRepository + 'static>(
    mut router: Router,
    registry: &mut OpenApiRegistry,
) -> Router {
    for builder in [
        OperationBuilder::get(BINARY_PATH).operation_id("calculator.evaluate_binary"),
        OperationBuilder::post(BINARY_PATH).operation_id("calculator.evaluate_binary_post"),
    ] {
        router = builder
            .summary("Apply a binary operator to two operands")
            .path_param("op", Type::String, "add, subtract, multiply, divide or power")
            .query_param("a", Type::Number, true, "Left operand")
            .query_param("b", Type::Number, true, "Right operand")
            .handler(handlers::evaluate_binary::<R>)
            .json_response::<dto::ResultDto>(registry, StatusCode::OK, "Operation result")
            .problem_response(registry, StatusCode::BAD_REQUEST, "Invalid or out-of-domain operand")
            .problem_response(registry, StatusCode::NOT_FOUND, "Unknown operator")
            .problem_response(registry, StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            .register(router, registry);
    }

    for builder in [
        OperationBuilder::get(UNARY_PATH).operation_id("calculator.evaluate_unary"),
        OperationBuilder::post(UNARY_PATH).operation_id("calculator.evaluate_unary_post"),
    ] {
        router = builder
            .summary("Apply a scientific function to one operand")
            .path_param(
                "function",
                Type::String,
                "sin, cos, tan, asin, acos, atan, sqrt, log10, ln, inverse or factorial",
            )
            .path_param("x", Type::Number, "Operand")
            .query_param("unit", Type::String, false, "Angle unit for trigonometry: deg (default) or rad")
            .handler(handlers::evaluate_unary::<R>)
            .json_response::<dto::ResultDto>(registry, StatusCode::OK, "Function result")
            .problem_response(registry, StatusCode::BAD_REQUEST, "Invalid or out-of-domain operand")
            .problem_response(registry, StatusCode::NOT_FOUND, "Unknown function")
            .problem_response(registry, StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            .register(router, registry);
    }

    router = OperationBuilder::get(RANDOM_PATH)
        .operation_id("calculator.random")
        .summary("Uniform random number in [0, 1)")
        .handler(handlers::random::<R>)
        .json_response::<dto::ResultDto>(registry, StatusCode::OK, "Random number")
        .problem_response(registry, StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        .register(router, registry);

    router = OperationBuilder::get(HISTORY_PATH)
        .operation_id("calculator.list_history")
        .summary("List recorded operations, oldest first")
        .tag("History")
        .handler(handlers::list_history::<R>)
        .json_array_response::<dto::HistoryEntryDto>(registry, StatusCode::OK, "History entries")
        .problem_response(registry, StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        .register(router, registry);

    OperationBuilder::delete(HISTORY_PATH)
        .operation_id("calculator.clear_history")
        .summary("Drop every history entry")
        .tag("History")
        .handler(handlers::clear_history::<R>)
        .empty_response(StatusCode::NO_CONTENT, "History cleared")
        .problem_response(registry, StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        .register(router, registry)
}
