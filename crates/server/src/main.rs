//! Founders board server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use founders_api::{AppState, RateLimiterState};
use founders_common::{Config, TokenSigner};
use founders_core::{FeedService, PollService, StatusService, UpdateService, UserService};
use founders_db::repositories::{
    PollOptionRepository, PollRepository, PollVoteRepository, StatusRepository, UpdateRepository,
    UserRepository,
};
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Wire repositories and services over one connection pool.
fn build_state(db: Arc<DatabaseConnection>, config: &Config) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(&db));
    let status_repo = StatusRepository::new(Arc::clone(&db));
    let update_repo = UpdateRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let option_repo = PollOptionRepository::new(Arc::clone(&db));
    let vote_repo = PollVoteRepository::new(Arc::clone(&db));

    let user_service = UserService::new(
        user_repo.clone(),
        status_repo.clone(),
        update_repo.clone(),
        TokenSigner::from_config(&config.auth),
    );
    let status_service = StatusService::new(user_repo.clone(), status_repo);
    let update_service = UpdateService::new(update_repo, user_repo.clone());
    let poll_service = PollService::new(poll_repo, option_repo, vote_repo, user_repo);
    let feed_service = FeedService::new(update_service.clone(), poll_service.clone());

    AppState {
        user_service,
        status_service,
        update_service,
        poll_service,
        feed_service,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "founders=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting founders board server...");

    // Load configuration
    let config = Config::load()?;

    let db = founders_db::connect(&config.database).await?;
    founders_db::migrate(&db).await?;

    let state = build_state(Arc::new(db), &config);

    // Build router
    let app = founders_api::app(state, RateLimiterState::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
