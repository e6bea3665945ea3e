//! Prometheus exposition endpoint

use axum::{Router, routing::get};
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// Build the `/metrics` router
///
/// Stateless, merged outside the `/api` tree.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// GET /metrics
async fn metrics_handler() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("metrics are not valid UTF-8: {}", e)))
}
