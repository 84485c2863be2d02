//! Profilingpoll server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use profilingpoll_api::{AppState, router as api_router};
use profilingpoll_common::{Config, TokenSigner};
use profilingpoll_core::{PollService, WalkthroughService};
use profilingpoll_db::repositories::{
    AnswerProfileRepository, AnswerRepository, PollRepository, ProfileRepository,
    QuestionRepository, WalkthroughProfileRepository, WalkthroughRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profilingpoll=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting profilingpoll server...");

    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = profilingpoll_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    profilingpoll_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let answer_repo = AnswerRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let answer_profile_repo = AnswerProfileRepository::new(Arc::clone(&db));
    let walkthrough_repo = WalkthroughRepository::new(Arc::clone(&db));
    let score_repo = WalkthroughProfileRepository::new(Arc::clone(&db));

    // Initialize services
    let poll_service = PollService::new(
        poll_repo.clone(),
        question_repo.clone(),
        answer_repo.clone(),
    );
    let walkthrough_service = WalkthroughService::new(
        walkthrough_repo,
        score_repo,
        poll_repo,
        question_repo,
        answer_repo,
        answer_profile_repo,
        profile_repo,
    );

    // Token signer for result URLs and session cookies
    let signer = TokenSigner::new(&config.session.secret);

    // Create app state
    let state = AppState {
        poll_service,
        walkthrough_service,
        signer,
        session_cookie: config.session.cookie_name.clone(),
    };

    // Build router
    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
