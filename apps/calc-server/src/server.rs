//! HTTP application assembly and serving.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::routing::get;
use axum::{Json, Router};
use calculator::{InMemoryHistory, Service, ServiceConfig};
use http::{HeaderName, Request, Response, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing::field::Empty;

use crate::config::AppConfig;
use crate::{cors, signals};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Calculator routes, health probes and the middleware stack.
#[must_use]
pub fn build_app(config: &AppConfig) -> Router {
    let service = Arc::new(Service::new(
        Arc::new(InMemoryHistory::default()),
        ServiceConfig {
            trig_decimals: config.calculator.trig_decimals,
        },
    ));

    let router = calculator::router(service)
        .route("/health", get(|| async { health() }))
        .route("/healthz", get(|| async { health() }));
    apply_middleware(router, config)
}

fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Layers are registered innermost first; requests pass
/// `SetRequestId` → `PropagateRequestId` → Trace → Timeout → `BodyLimit` → CORS → router.
fn apply_middleware(mut router: Router, config: &AppConfig) -> Router {
    if config.cors.enabled {
        router = router.layer(cors::build_cors_layer(&config.cors));
    }

    router = router.layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes));

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        Duration::from_secs(config.server.request_timeout_secs),
    ));

    router = apply_trace_layer(router);

    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(header.clone()));
    router.layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", latency.as_millis());
                tracing::debug!(parent: span, "response sent");
            }),
    )
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
/// I/O failures from the listener.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;
    tracing::info!("calculator server stopped");
    Ok(())
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
///
/// # Errors
/// Invalid or unavailable bind address, or a server I/O failure.
pub async fn run(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("listener has no local address")?;
    tracing::info!(
        addr = %local,
        timeout_secs = config.server.request_timeout_secs,
        cors = config.cors.enabled,
        "calculator server listening"
    );

    serve(listener, build_app(&config), signals::shutdown_signal()).await
}
