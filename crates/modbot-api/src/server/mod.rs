//! Server setup and initialization
//!
//! Wires the stores, the platform client and the service context together,
//! restores persisted expiries, runs the session sweep, and serves HTTP
//! until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use modbot_common::{AppConfig, AppError};
use modbot_core::SnowflakeGenerator;
use modbot_db::{
    create_pool, install_schema, PgActionRepository, PgExpiryRepository, PgQuoteRepository,
    PgSettingsRepository,
};
use modbot_platform::{HttpPlatformClient, HttpPlatformConfig};
use modbot_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Connect to PostgreSQL and the platform, and build the application state
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = modbot_db::DatabaseConfig::new(
        config.database.url.clone(),
        config.database.max_connections,
        config.database.min_connections,
    );
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    install_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let platform = HttpPlatformClient::new(&HttpPlatformConfig {
        api_url: config.platform.api_url.clone(),
        token: config.platform.token.clone(),
        timeout: config.platform.timeout,
    })
    .map_err(|e| AppError::Config(e.to_string()))?;

    let service_context = ServiceContextBuilder::new()
        .action_repo(Arc::new(PgActionRepository::new(pool.clone())))
        .quote_repo(Arc::new(PgQuoteRepository::new(pool.clone())))
        .settings_repo(Arc::new(PgSettingsRepository::new(pool.clone())))
        .expiry_repo(Arc::new(PgExpiryRepository::new(pool.clone())))
        .platform(Arc::new(platform))
        .moderation(config.moderation.clone())
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(
            config.snowflake.worker_id,
        )))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config.dispatch.token.as_str()).with_pool(pool))
}

/// Periodically conclude overdue giveaways and prune old tombstones
pub fn spawn_session_sweep(
    ctx: ServiceContext,
    config: &modbot_common::SessionConfig,
) -> JoinHandle<()> {
    let retention = config.retention;
    let mut ticker = tokio::time::interval(config.sweep_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tokio::spawn(async move {
        loop {
            ticker.tick().await;
            let report = ctx.sessions().sweep(retention, Utc::now()).await;
            debug!(
                concluded = report.concluded,
                pruned = report.pruned,
                "Session sweep finished"
            );
        }
    })
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {e}")))?;

    let state = create_app_state(&config).await?;
    let ctx = state.service_context().clone();

    let restored = ctx.scheduler().restore().await;
    info!(restored, "Pending expiries re-armed");
    let sweep = spawn_session_sweep(ctx.clone(), &config.sessions);

    let app = create_app(state);
    let result = run_server(app, addr).await;

    sweep.abort();
    ctx.shutdown();
    info!("Timers stopped; persisted expiries resume on next start");

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
