//! Documentation of a candidate voting platform.
//!
//! Candidates submit a name and answers to a fixed set of questions, everyone else votes.
//! Each branch (`senate`, `treasury`) is an independent election.
//!
//!
//!
//! # General Infrastructure
//! - Single axum server, frontend build served from the same origin
//! - Every API route lives under `/api/{branch}`
//! - One MongoDB client shared by all requests, one collection per branch
//! - No caching, no transactions, votes are atomic at the document level
//!
//!
//!
//! # Routes
//!
//! | Method | Path | Result |
//! |---|---|---|
//! | GET | `/api/{branch}/candidates` | all candidates, shuffled |
//! | POST | `/api/{branch}/candidates` | `201` on success |
//! | PATCH | `/api/{branch}/candidates/{id}/votes` | one more vote |
//! | GET | `/api/{branch}/answers` | 4 shuffled buckets, one per question |
//! | GET | `/api/{branch}/leaderboard` | most votes first |
//! | GET | `/api/{branch}/questions` | always `Not implemented` |
//!
//! Bodies are JSend envelopes, see [`envelope`].
//!
//!
//!
//! # Notes
//!
//! ## Validation
//! Submissions need a name, exactly 4 answers and at most 280 characters per answer.
//! Answers sent as `[]` are reported as the wrong count, a missing `answers` field
//! as missing answers.
//!
//! ## Votes
//! Voting for a well formed id that does not exist succeeds and changes nothing.
//!
//!
//!
//! # Setup
//!
//! Environment.
//! ```sh
//! export MONGODB_URI="mongodb://localhost:27017"
//! export RUST_LOG=info
//! ```
//!
//! Run.
//! ```sh
//! cargo run --bin vote-backend
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, patch},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod branch;
pub mod config;
pub mod database;
pub mod envelope;
pub mod error;
pub mod memory;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use branch::branch_ctx;
use routes::{
    answers_handler, candidates_handler, create_candidate_handler, leaderboard_handler,
    questions_handler, votes_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;
    info!("Using {} store", state.store.backend_tag());

    info!("Starting server...");

    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutting down...");
    state.store.shutdown().await;
}

/// API routes behind the branch check, frontend files for everything else.
pub fn build_router(state: Arc<State>) -> Router {
    let api = Router::new()
        .route(
            "/api/{branch}/candidates",
            get(candidates_handler).post(create_candidate_handler),
        )
        .route("/api/{branch}/candidates/{id}/votes", patch(votes_handler))
        .route("/api/{branch}/answers", get(answers_handler))
        .route("/api/{branch}/leaderboard", get(leaderboard_handler))
        .route("/api/{branch}/questions", get(questions_handler))
        .route_layer(from_fn(branch_ctx));

    api.fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
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
