use crate::infra::{AppState, InMemoryBatchStore, InMemoryStatusLog};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use finlens::intake::{intake_router, IntakeProfile, UploadIntakeController};
use serde_json::json;

pub(crate) fn with_intake_routes(
    controller: UploadIntakeController<InMemoryStatusLog, InMemoryBatchStore>,
    profile: IntakeProfile,
) -> axum::Router {
    intake_router(controller, profile)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/intake/batches/latest",
            axum::routing::get(latest_batch_endpoint),
        )
        .route(
            "/api/v1/intake/status/history",
            axum::routing::get(status_history_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn latest_batch_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    match state.batches.latest_summary() {
        Some(summary) => {
            let payload = json!({
                "headline": summary.headline(),
                "summary": summary,
            });
            (StatusCode::OK, Json(payload))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no batch has been uploaded yet" })),
        ),
    }
}

pub(crate) async fn status_history_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "updates": state.history.recent() }))
}
