//! The binary entry point for the application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::middleware::request_response_logger;
use app_core::oauth::{GoogleOAuthProvider, OAuthProvider};
use app_core::session::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE_SECS, SessionSettings};
use app_core::uid::{Generator, UniqueId};
use axum::http::StatusCode;
use axum::{Json, Router, middleware};
use base64::Engine as _;
use base64::engine::general_purpose;
use tokio::signal;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Minimum decoded length accepted by [`Key::from`].
const SESSION_KEY_MIN_BYTES: usize = 64;
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("❌ Application failed to start: {err}");
        std::process::exit(1);
    }
}

/// Initializes all dependencies and starts the web server.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // The .watch() method enables automatic reloading when the config file changes.
    let config = Arc::new(
        Config::builder("config/config.yaml")
            .watch_interval(Duration::from_secs(5))
            .watch()
            .build()?,
    );

    // Initialize the session cookie encryption key.
    let secret = general_purpose::STANDARD.decode(config.get::<String>("session.secret")?)?;
    if secret.len() < SESSION_KEY_MIN_BYTES {
        return Err(format!("session.secret must decode to at least {SESSION_KEY_MIN_BYTES} bytes").into());
    }
    let session = SessionSettings::new(Key::from(&secret))
        .with_cookie_name(config.get_or("session.cookie_name", DEFAULT_COOKIE_NAME.to_string())?)
        .with_max_age_secs(config.get_or("session.max_age_secs", DEFAULT_MAX_AGE_SECS)?)
        .with_secure(config.get_or("session.secure", false)?);

    // Initialize the Google OpenID Connect client.
    let oauth: Arc<dyn OAuthProvider> = Arc::new(GoogleOAuthProvider::new(
        config.get("oauth.google.client_id")?,
        config.get("oauth.google.client_secret")?,
        Duration::from_secs(config.get_or("oauth.google.timeout_secs", DEFAULT_OUTBOUND_TIMEOUT_SECS)?),
    )?);

    // Initialize the document ID generator.
    let uid: Arc<dyn Generator> = Arc::new(UniqueId::new());

    // Initialize portal module
    let portal_state = portal::new(portal::Dependency { config: config.clone(), session, oauth, uid })?;

    // Create the Router and Middlewares
    let static_dir = config.get_or("server.static_dir", "static".to_string())?;
    let timeout_secs = Duration::from_secs(config.get::<u64>("server.timeout_secs")?);
    let app = Router::new()
        .merge(portal::create_router(portal_state))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "Endpoint not found"})),
            )
        })
        .method_not_allowed_fallback(|| async {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(serde_json::json!({"message": "Method not allowed"})),
            )
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout_secs)),
        );

    let server_address = config.get::<String>("server.address")?;
    let listener = tokio::net::TcpListener::bind(&server_address).await?;

    tracing::info!("🚀 listening on {}", listener.local_addr()?);

    // Spawn a task to listen for shutdown signals (Ctrl+C and SIGTERM).
    let (shutdown_tx, _) = broadcast::channel(1);
    spawn_shutdown_listener(shutdown_tx.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_tx.subscribe().recv().await.ok();
            tracing::info!("🛑 Server is shutting down gracefully...");
        })
        .await?;

    Ok(())
}

/// Spawns a background task to listen for system shutdown signals.
fn spawn_shutdown_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                },
                Err(err) => {
                    tracing::error!("Failed to install SIGTERM handler: {}", err);
                    std::future::pending::<()>().await;
                },
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("🔻 Received SIGINT (Ctrl+C)")},
            _ = terminate => { tracing::info!("🔻 Received SIGTERM")},
        }

        if shutdown_tx.send(()).is_err() {
            tracing::error!("Failed to send shutdown signal");
        }
    });
}
