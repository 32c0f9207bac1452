use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::intake::controller::IntakeTimings;
use crate::intake::domain::IntakeStatus;
use crate::intake::intake_router;
use crate::intake::profiles::IntakeProfile;
use crate::intake::router::{dismiss_handler, status_handler, IntakeRouterState};

fn post_json(uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializable body"),
        ))
        .expect("request builds")
}

#[tokio::test(start_paused = true)]
async fn submit_route_accepts_spreadsheets() {
    let (controller, _) = build_controller(IntakeTimings::default());
    let router = intake_router(controller.clone(), IntakeProfile::IncomeStatement);

    let response = router
        .oneshot(post_json(
            "/api/v1/intake/submissions",
            json!({
                "files": [
                    { "name": "pnl.xlsx", "size_bytes": 4096, "type": "application/vnd.ms-excel" },
                    { "name": "logo.png", "size_bytes": 512, "type": "image/png" }
                ]
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("uploading")));
    assert_eq!(payload.get("profile"), Some(&json!("income_statement")));
    assert_eq!(
        payload.get("accepted_formats").and_then(Value::as_str),
        Some("Accepted formats: .xlsx, .xls, .csv • Max 5 files")
    );
    assert_eq!(controller.status().status, IntakeStatus::Uploading);
}

#[tokio::test(start_paused = true)]
async fn submit_route_reports_rejections() {
    let (controller, log) = build_controller(IntakeTimings::default());
    let router = intake_router(controller, IntakeProfile::IncomeStatement);

    let response = router
        .oneshot(post_json(
            "/api/v1/intake/submissions",
            json!({
                "profile": "business_model",
                "files": [{ "name": "pnl.xlsx", "size_bytes": 4096 }]
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("No valid files found. Please check file types.")
    );
    assert_eq!(payload.get("attempt"), Some(&json!(1)));
    assert!(log.batches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn submit_route_conflicts_while_busy() {
    let (controller, _) = build_controller(IntakeTimings::default());
    controller
        .submit(files(&["a.csv"]), &spreadsheet_config())
        .expect("controller idle");
    let router = intake_router(controller, IntakeProfile::IncomeStatement);

    let response = router
        .oneshot(post_json(
            "/api/v1/intake/submissions",
            json!({ "files": [{ "name": "b.csv", "size_bytes": 10 }] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("uploading")));
}

#[tokio::test(start_paused = true)]
async fn status_handler_reports_error_message_and_dismiss_clears_it() {
    let (controller, _) = build_controller(IntakeTimings::default());
    controller
        .submit(files(&["a.pdf"]), &spreadsheet_config())
        .expect("controller idle");

    let state = Arc::new(IntakeRouterState {
        controller: controller.clone(),
        default_profile: IntakeProfile::IncomeStatement,
    });

    let response = status_handler(State(state.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("error")));
    assert_eq!(payload.get("headline"), Some(&json!("Upload failed")));
    assert_eq!(
        payload.get("message").and_then(Value::as_str),
        Some("No valid files found. Please check file types.")
    );

    let response = dismiss_handler(State(state.clone())).await;
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("dismissed"), Some(&json!(true)));
    assert_eq!(payload.get("status"), Some(&json!("idle")));

    let response = dismiss_handler(State(state)).await;
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("dismissed"), Some(&json!(false)));
}

#[tokio::test]
async fn status_route_starts_idle() {
    let (controller, _) = build_controller(IntakeTimings::immediate());
    let router = intake_router(controller, IntakeProfile::BusinessModel);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/intake/status")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("idle")));
    assert_eq!(payload.get("attempt"), Some(&json!(0)));
    assert!(payload.get("message").map_or(true, Value::is_null));
    assert_eq!(
        payload.get("accepted_formats").and_then(Value::as_str),
        Some("Accepted formats: .pdf, .docx, .doc • Max 15 files")
    );
}
