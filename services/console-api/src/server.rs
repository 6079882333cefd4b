use crate::cli::ServeArgs;
use crate::infra::{seeded_backend, AppState};
use crate::routes::with_console_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireboard_console::config::AppConfig;
use hireboard_console::error::AppError;
use hireboard_console::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = Arc::new(seeded_backend(args.seed));
    info!(applications = backend.len(), "seeded reference backend");

    let app = with_console_routes(backend)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hireboard applications API ready");

    axum::serve(listener, app).await?;
    Ok(())
}
