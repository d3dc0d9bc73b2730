use crate::cli::ServeArgs;
use crate::infra::{structured_model, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use creator_match::config::AppConfig;
use creator_match::error::AppError;
use creator_match::marketplace::{Marketplace, MemoryObjectStorage, MemoryStore};
use creator_match::telemetry;
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

    let store = Arc::new(MemoryStore::new());
    let storage = Arc::new(MemoryObjectStorage::new(config.storage.public_url.clone()));
    let model = structured_model(&config.model);
    let (marketplace, _scoring_dispatcher) =
        Marketplace::with_scoring_queue(store, model, storage);

    let app = with_marketplace_routes(Arc::new(marketplace))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        public_url = %config.storage.public_url,
        "creator marketplace ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
