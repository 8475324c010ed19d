use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::report::{PdfRenderer, WkhtmltopdfRenderer};
use service::seeder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("shutdown signal received");
}

/// Public entry: connect, migrate, seed, then serve until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    init_logging(cfg.server.log_json);

    // DB connection, schema and bootstrap rows
    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None).await.map_err(|e| StartupError::Runtime(format!("migrations: {e}")))?;
    let seeded = seeder::run(&db, &cfg.auth).await.map_err(|e| StartupError::Runtime(format!("seed: {e}")))?;
    info!(
        permissions_added = seeded.permissions_added,
        admin_created = seeded.admin_created,
        "bootstrap data ready"
    );

    let renderer = WkhtmltopdfRenderer::from_config(&cfg.pdf).map_err(|e| StartupError::Runtime(e.to_string()))?;
    let pdf: Arc<dyn PdfRenderer> = Arc::new(renderer);

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository::new(db.clone()));
    let auth = Arc::new(AuthService::new(repo, AuthConfig::from(&cfg.auth)));

    let state = ServerState { db, auth, pdf, institution: Arc::from(cfg.pdf.institution_name.as_str()) };

    // Build router
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting activos_fijos server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
