use nexus_access_control::AccessEvaluator;
use nexus_biometric::MinutiaeRecordExtractor;
use nexus_core::SystemClock;
use nexus_platform_access::Authorizer;
use nexus_scheduler::SessionSweeper;
use nexus_server::{
    app,
    auth::AppState,
    config::ServerConfig,
    db::{PgAccessRepository, PgSessionRepository},
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let access_repo = Arc::new(PgAccessRepository::new(db_pool.clone()));
    let session_repo = Arc::new(PgSessionRepository::new(db_pool));
    let clock = Arc::new(SystemClock);

    // Sweep expired sessions until shutdown
    let shutdown = CancellationToken::new();
    let sweeper = SessionSweeper::new(
        session_repo.clone(),
        clock.clone(),
        config.session.sweep_interval(),
        shutdown.clone(),
    );
    let sweeper_handle = tokio::spawn(sweeper.run());

    let evaluator = AccessEvaluator::new(
        access_repo.clone(),
        Arc::new(MinutiaeRecordExtractor),
        config.biometric,
        clock.clone(),
        config.access,
    );
    let authorizer = Authorizer::new(session_repo.clone(), session_repo, clock);
    let app_state = Arc::new(AppState::new(
        evaluator,
        authorizer,
        access_repo.clone(),
        access_repo,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app::router(app_state))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .expect("server error");

    shutdown.cancel();
    if let Err(e) = sweeper_handle.await {
        tracing::warn!(error = %e, "Session sweeper did not stop cleanly");
    }
}

/// Resolves on Ctrl-C or SIGTERM and cancels background tasks.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down");
    shutdown.cancel();
}
