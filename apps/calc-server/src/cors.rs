use std::time::Duration;

use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// Build the CORS layer; invalid origins and methods are skipped.
#[must_use]
pub fn build_cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().allow_headers(Any);

    if cfg.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = cfg
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    if !methods.is_empty() {
        layer = layer.allow_methods(methods);
    }

    if cfg.max_age_secs > 0 {
        layer = layer.max_age(Duration::from_secs(cfg.max_age_secs));
    }

    layer
}
