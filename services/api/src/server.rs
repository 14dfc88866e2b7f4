use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::{info, warn};

use places::config::AppConfig;
use places::directory::router::ApiContext;
use places::directory::service::DirectoryService;
use places::directory::views::Links;
use places::error::AppError;
use places::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{demo_authenticator, AppState, InMemoryDirectory};
use crate::routes::with_directory_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryDirectory::default());
    let context = Arc::new(ApiContext {
        service: DirectoryService::new(repository),
        authenticator: Arc::new(demo_authenticator()),
        links: Links::new(config.base_url.clone()),
    });

    let app = with_directory_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    warn!("in-memory store and fixed development accounts are active; data does not survive restarts");
    info!(?config.environment, %addr, base_url = %config.base_url, "places directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}
