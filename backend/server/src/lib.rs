//! # Intern Dashboard
//!
//! Backend for the intern fundraising dashboard.
//!
//!
//!
//! # General Infrastructure
//! - Single axum server, JSON in and out
//! - Accounts live in Redis, see [`database`]
//! - Ranking and rewards are computed per request by the `standings` crate
//! - Nothing is cached, the account count is small enough to sort on every request
//!
//!
//!
//! # Endpoints
//!
//! | Method | Path | Notes |
//! |---|---|---|
//! | GET | `/health` | store reachability and account count |
//! | POST | `/auth/signup` | `{name, email, password}` |
//! | POST | `/auth/login` | `{email, password}` |
//! | GET | `/dashboard?userId=` | stats, rank and the annotated reward ladder |
//! | GET | `/leaderboard` | top `LEADERBOARD_LIMIT` accounts |
//! | PUT | `/user/{userId}/stats` | `{totalRaised?, referrals?}` |
//!
//! Credentials never leave the server. Every account in a response goes through
//! [`standings::UserAccount::public`].
//!
//!
//!
//! # Credentials
//!
//! Passwords are stored as Argon2id PHC strings. Login always verifies against the
//! hash, there is no plaintext comparison path.
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `RUST_PORT` | `1111` |
//! | `STORE` | `redis` (`memory` for local runs) |
//! | `REDIS_URL` | `redis://127.0.0.1:6379` |
//! | `LEADERBOARD_LIMIT` | `20` |
//! | `STARTER_TOTAL` | `1000` |
//! | `REWARD_LADDER_PATH` | unset, built-in ladder |
//! | `CORS_ORIGIN` | unset, any origin |
//! | `RUST_LOG` | unset |
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! docker run -p 6379:6379 redis:7
//! RUST_LOG=info cargo run --bin dashboard
//! ```
//!
//! Seed demo accounts.
//! ```sh
//! cargo run --bin seeder -- --url http://localhost:1111
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod payloads;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use routes::{
    dashboard_handler, health_handler, leaderboard_handler, login_handler, signup_handler,
    stats_handler,
};
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let cors = match &state.config.cors_origin {
        Some(origin) => cors.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS_ORIGIN {origin}"))?,
        ),
        None => cors.allow_origin(Any),
    };

    Ok(Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/user/{user_id}/stats", put(stats_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load().map_err(|e| anyhow!(e))?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let app = build_router(state.clone())?;

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
