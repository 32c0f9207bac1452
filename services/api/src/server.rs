use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBatchStore, InMemoryStatusLog};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use finlens::config::AppConfig;
use finlens::error::AppError;
use finlens::intake::UploadIntakeController;
use finlens::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(profile) = args.profile.take() {
        config.intake.profile = profile;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let batches = Arc::new(InMemoryBatchStore::default());
    let history = Arc::new(InMemoryStatusLog::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        batches: batches.clone(),
        history: history.clone(),
    };

    let controller = UploadIntakeController::new(history, batches, config.intake.timings);

    let app = with_intake_routes(controller, config.intake.profile)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        profile = %config.intake.profile,
        "document intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
