//! # ASIA Chat Server
//!
//! File: cli/src/commands/serve/mod.rs
//!
//! ## Overview
//!
//! `asia serve` runs the chat backend: the static chat UI plus the
//! `POST /chat` JSON endpoint backed by the answer resolver.
//!
//! ## Architecture
//!
//! - `config.rs`: command-line arguments and the effective `ServerConfig`
//! - `handlers.rs`: the `/chat` handler, its payloads and error mapping
//! - `server_logic.rs`: router construction, binding and graceful shutdown
//!
//! ## Examples
//!
//! ```bash
//! # Default: 0.0.0.0:5001, bundled UI from cli/static
//! asia serve
//!
//! # Local only, custom port, no CORS headers
//! asia serve --host 127.0.0.1 --port 9000 --no-cors
//! ```
//!
use crate::core::config::Config;
use crate::core::error::Result;
use crate::resolver::AnswerResolver;
use std::sync::Arc;
use tracing::{info, info_span};

pub use config::ServeArgs;

/// Server arguments and effective configuration.
pub mod config;

/// The `/chat` endpoint.
pub mod handlers;

/// Axum router and server lifecycle.
pub mod server_logic;

/// # Handle Serve Command (`handle_serve`)
///
/// Merges `args` over the loaded configuration, builds the resolver once and
/// runs the server until shutdown.
pub async fn handle_serve(args: ServeArgs, app_config: &Config) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);

    let config = config::load_server_config(args, &app_config.server).await?;
    info!("Effective server config: {:?}", config);

    let resolver =
        AnswerResolver::from_config(app_config)?.with_span(info_span!("resolver", mode = "serve"));
    server_logic::run_server(config, Arc::new(resolver)).await?;

    Ok(())
}
