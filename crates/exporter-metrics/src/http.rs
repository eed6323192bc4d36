//! Pull endpoint for the metrics collector.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/status` | Last-known status as JSON |

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::registry::ExporterMetrics;
use crate::status::{StatusBoard, StatusDocument};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub metrics: ExporterMetrics,
    pub board: StatusBoard,
}

/// Build the exporter router.
pub fn build_router(metrics: ExporterMetrics, board: StatusBoard) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/status", get(status_document))
        .with_state(HttpState { metrics, board })
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<HttpState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /status
pub async fn status_document(State(state): State<HttpState>) -> Json<StatusDocument> {
    Json(state.board.snapshot().await)
}
