use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::controller::{BatchHandler, IntakeError, StatusObserver, UploadIntakeController};
use super::domain::CandidateFile;
use super::profiles::IntakeProfile;

/// Body of a drop-zone submission.
#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub files: Vec<CandidateFile>,
    #[serde(default)]
    pub profile: Option<IntakeProfile>,
}

pub struct IntakeRouterState<O, H> {
    pub controller: UploadIntakeController<O, H>,
    pub default_profile: IntakeProfile,
}

/// Router builder exposing the drop zone over HTTP.
pub fn intake_router<O, H>(
    controller: UploadIntakeController<O, H>,
    default_profile: IntakeProfile,
) -> Router
where
    O: StatusObserver + 'static,
    H: BatchHandler + 'static,
{
    let state = Arc::new(IntakeRouterState {
        controller,
        default_profile,
    });

    Router::new()
        .route("/api/v1/intake/submissions", post(submit_handler::<O, H>))
        .route("/api/v1/intake/status", get(status_handler::<O, H>))
        .route(
            "/api/v1/intake/status/dismiss",
            post(dismiss_handler::<O, H>),
        )
        .with_state(state)
}

pub(crate) async fn submit_handler<O, H>(
    State(state): State<Arc<IntakeRouterState<O, H>>>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    O: StatusObserver + 'static,
    H: BatchHandler + 'static,
{
    let profile = request.profile.unwrap_or(state.default_profile);
    let config = profile.configuration();

    match state.controller.submit(request.files, &config) {
        Ok(handle) => match handle.rejection() {
            Some(rejection) => {
                let payload = json!({
                    "attempt": handle.attempt(),
                    "status": "error",
                    "error": rejection.to_string(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
            }
            None => {
                let payload = json!({
                    "attempt": handle.attempt(),
                    "status": "uploading",
                    "profile": profile,
                    "accepted_formats": config.describe(),
                });
                (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
            }
        },
        Err(IntakeError::Busy { status }) => {
            let payload = json!({
                "error": "an upload is already in progress",
                "status": status,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<O, H>(
    State(state): State<Arc<IntakeRouterState<O, H>>>,
) -> Response
where
    O: StatusObserver + 'static,
    H: BatchHandler + 'static,
{
    let current = state.controller.status();
    let payload = json!({
        "attempt": current.attempt,
        "status": current.status,
        "headline": current.status.headline(),
        "message": current.message,
        "at": current.at,
        "accepted_formats": state.default_profile.configuration().describe(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn dismiss_handler<O, H>(
    State(state): State<Arc<IntakeRouterState<O, H>>>,
) -> Response
where
    O: StatusObserver + 'static,
    H: BatchHandler + 'static,
{
    let dismissed = state.controller.dismiss();
    let payload = json!({
        "dismissed": dismissed,
        "status": state.controller.status().status,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
