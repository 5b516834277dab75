//! # ASIA HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//!
//! ## Overview
//!
//! Builds the Axum router and runs it until Ctrl+C or SIGTERM:
//! - `GET /` serves the configured index page of the chat UI
//! - `POST /chat` answers a message (see `handlers`)
//! - any other path is looked up in the static directory, 404 if absent
//!
//! Requests are traced with `TraceLayer`; CORS headers are permissive unless
//! disabled.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let config = config::load_server_config(args, &app_config.server).await?;
//! let resolver = Arc::new(AnswerResolver::from_config(&app_config)?);
//! server_logic::run_server(config, resolver).await?;
//! ```
//!
use super::config::ServerConfig;
use super::handlers::{self, AppState};
use crate::core::error::Result;
use crate::resolver::AnswerResolver;
use anyhow::Context;
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

/// # Run HTTP Server (`run_server`)
///
/// Binds `config.host:config.port`, prints where the UI is reachable and
/// serves until a shutdown signal arrives.
///
/// ## Errors
///
/// Fails if the listener cannot be bound (port in use, permissions) or the
/// server stops with an I/O error.
pub async fn run_server(config: ServerConfig, resolver: Arc<AnswerResolver>) -> Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let app = create_app(&config, resolver);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;
    let bound = listener.local_addr().unwrap_or(addr);

    println!("\n=================================================================");
    println!("📂 Chat UI from:      {}", config.static_dir.display());
    println!("🌐 Local URL:         http://localhost:{}", bound.port());
    println!("💬 Chat endpoint:     POST http://localhost:{}/chat", bound.port());
    println!("⚙️  Binding to address: {}", bound);
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("=================================================================\n");

    info!(
        "Starting server on {} with UI from {}",
        bound,
        config.static_dir.display()
    );
    println!("Server starting! Press Ctrl+C to stop.");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Resolves when Ctrl+C or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// # Create Axum Application (`create_app`)
///
/// The full router, including tracing and CORS layers. Public so tests can
/// drive it in-process with `tower::ServiceExt::oneshot`.
pub fn create_app(config: &ServerConfig, resolver: Arc<AnswerResolver>) -> Router {
    let cors_layer = if config.enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route_service("/", ServeFile::new(config.index_path()))
        .route("/chat", post(handlers::chat))
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(AppState { resolver })
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(cors_layer),
        )
}
