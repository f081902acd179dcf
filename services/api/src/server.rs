use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRegistrationStore};
use crate::routes::with_registration_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use stem_enroll::config::AppConfig;
use stem_enroll::error::AppError;
use stem_enroll::telemetry;
use stem_enroll::workflows::registration::{
    PgReferenceDirectory, PgRegistrationStore, ReferenceCatalog, RegistrationPolicy,
    RegistrationService,
};
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

    let policy = RegistrationPolicy::from_env()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let routes = match &config.database.url {
        Some(url) => {
            let store =
                Arc::new(PgRegistrationStore::connect(url, config.database.max_connections).await?);
            let directory = Arc::new(PgReferenceDirectory::new(store.pool().clone()));
            info!("registration store: postgres");
            with_registration_routes(Arc::new(RegistrationService::new(
                store, directory, policy,
            )))
        }
        None => {
            warn!("DATABASE_URL not set; serving from the in-memory demo adapters");
            let store = Arc::new(InMemoryRegistrationStore::default());
            let directory = Arc::new(ReferenceCatalog::sample());
            with_registration_routes(Arc::new(RegistrationService::new(
                store, directory, policy,
            )))
        }
    };

    let app = routes.layer(Extension(app_state)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "registration service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
