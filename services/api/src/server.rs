use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryVerificationRepository};
use crate::routes::with_verification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fuel_services::config::AppConfig;
use fuel_services::error::AppError;
use fuel_services::telemetry;
use fuel_services::verification::{ProviderSet, RatingPolicy, SystemClock, VerificationServices};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let repository = Arc::new(InMemoryVerificationRepository::default());
    let services = Arc::new(VerificationServices::new(
        repository,
        ProviderSet::simulated(),
        Arc::new(SystemClock),
        &config.verification,
        RatingPolicy::default(),
    ));

    if config.verification.simulation_enabled {
        warn!("nafath simulation endpoint is enabled");
    }

    let app = with_verification_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fuel services verification api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
