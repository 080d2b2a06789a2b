use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use certverify::config::Config;
use certverify::db::SqliteCertificateStore;
use certverify::middleware::CorsPolicy;
use certverify::router::{AppState, certverify_router};
use certverify::service::{CertificateService, seed_loader};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        match_iqama = cfg.match_iqama,
        store_timeout_secs = cfg.store_timeout_secs,
        verbose_errors = cfg!(feature = "verbose-errors"),
        "configuration loaded"
    );

    // A store that cannot be opened is fatal; never serve without one.
    let store = SqliteCertificateStore::connect(&cfg.database_url, cfg.store_timeout()).await?;
    store.init_schema().await?;
    info!("certificate store ready");

    let certificates =
        CertificateService::new(Arc::new(store), cfg.store_timeout(), cfg.match_iqama);

    if let Some(seed_path) = cfg.seed_path.as_ref() {
        match seed_loader::load_from_path(seed_path) {
            Ok(records) if !records.is_empty() => {
                let report = seed_loader::seed(&certificates, records).await?;
                info!(
                    path = %seed_path.display(),
                    inserted = report.inserted,
                    duplicates = report.duplicates,
                    rejected = report.rejected,
                    "seeded certificates"
                );
            }
            Ok(_) => {
                info!(path = %seed_path.display(), "no seed certificates discovered");
            }
            Err(e) => {
                warn!(
                    path = %seed_path.display(),
                    error = %e,
                    "failed to load seed certificates"
                );
            }
        }
    }

    let cors = CorsPolicy::new(cfg.origins()?)?;
    let app = certverify_router(AppState::new(certificates), cors);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
