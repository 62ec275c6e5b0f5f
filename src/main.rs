//! Campus Server — school management platform backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use campus_core::config::AppConfig;
use campus_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("CAMPUS_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Campus v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = campus_database::connection::DatabasePool::connect(&config.database).await?;
    campus_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(campus_database::repositories::UserRepository::new(
        db.pool().clone(),
    ));
    let school_repo = Arc::new(campus_database::repositories::SchoolRepository::new(
        db.pool().clone(),
    ));
    let session_repo = Arc::new(campus_database::repositories::SessionRepository::new(
        db.pool().clone(),
    ));
    let period_repo = Arc::new(campus_database::repositories::PeriodRepository::new(
        db.pool().clone(),
    ));

    // ── Step 3: Auth system ──────────────────────────────────────
    tracing::info!("Initializing authentication system...");
    let codec = campus_auth::token::TokenCodec::new(&config.auth);
    let hasher = campus_auth::password::PasswordHasher::new(&config.auth);

    let registry = Arc::new(campus_auth::registry::SessionRegistry::new(
        session_repo,
        user_repo.clone(),
    ));
    // A failure here is fatal: serving requests without the session
    // mirror would log every client out.
    registry.init().await?;

    let resolver = Arc::new(campus_auth::scope::RoleScopeResolver::new(
        school_repo,
        period_repo,
        &config.session,
    ));

    let session_manager = Arc::new(campus_auth::session::SessionManager::new(
        codec,
        Arc::clone(&registry),
        resolver,
        user_repo,
        hasher,
        &config.auth,
        &config.session,
    ));
    tracing::info!("Authentication system initialized");

    // ── Step 4: Background expired-session sweep ─────────────────
    let sweep_registry = Arc::clone(&registry);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match sweep_registry.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
                Err(e) => tracing::warn!(error = %e, "Expired-session sweep failed"),
            }
        }
    });

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app_state = campus_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db.pool().clone(),
        session_manager,
    };

    let app = campus_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Campus server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("Campus server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
