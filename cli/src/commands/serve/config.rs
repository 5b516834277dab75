//! # ASIA HTTP Server Configuration
//!
//! File: cli/src/commands/serve/config.rs
//!
//! ## Overview
//!
//! Produces the effective `ServerConfig` for `asia serve`. Settings come from:
//! 1. Command-line arguments and `$PORT` (highest priority)
//! 2. The `[server]` section of the loaded configuration (see `core::config`)
//! 3. Built-in defaults (lowest priority, port 5001)
//!
//! The static directory is resolved to an absolute path. A missing directory
//! is only a warning, since `/chat` works without the UI; a path that exists
//! but is not a directory is an error.
//!
//! ## Examples
//!
//! ```bash
//! # Serve on the default port with the bundled chat UI
//! asia serve
//!
//! # Port from the environment, UI from a build directory
//! PORT=8080 asia serve --static-dir ./dist --no-cors
//! ```
//!
use crate::core::config::ServerSection;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::{env, path::PathBuf};
use tracing::{debug, warn};

/// # Serve Command Arguments (`ServeArgs`)
///
/// Every flag is optional; an absent flag leaves the configured value alone.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Network IP address to bind to (default `0.0.0.0`).
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (default 5001).
    #[arg(long, short, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding the chat UI and its assets (default: the bundled `cli/static`).
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// File served for `GET /` (default `index.html`).
    #[arg(long, short)]
    pub index: Option<String>,

    /// Disables Cross-Origin Resource Sharing (CORS) headers.
    #[arg(long)]
    pub no_cors: bool,
}

/// # Effective Server Configuration (`ServerConfig`)
///
/// The consolidated settings the server logic runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// The network IP address the server will bind to.
    pub host: IpAddr,

    /// The network port the server will listen on.
    pub port: u16,

    /// The absolute path to the static directory.
    pub static_dir: PathBuf,

    /// The file served for `GET /`.
    pub index_file: String,

    /// Indicates whether CORS headers should be sent.
    pub enable_cors: bool,
}

impl ServerConfig {
    /// Applies `args` on top of the `[server]` section.
    pub fn merge(args: ServeArgs, section: &ServerSection) -> Self {
        Self {
            host: args.host.unwrap_or(section.host),
            port: args.port.unwrap_or(section.port),
            static_dir: args
                .static_dir
                .unwrap_or_else(|| PathBuf::from(&section.static_dir)),
            index_file: args.index.unwrap_or_else(|| section.index_file.clone()),
            // --no-cors can only switch CORS off.
            enable_cors: section.enable_cors && !args.no_cors,
        }
    }

    /// Path of the page served for `GET /`.
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }

    /// # Resolve Static Directory (`resolve_static_dir`)
    ///
    /// Makes `static_dir` absolute and canonical when it exists.
    ///
    /// ## Errors
    ///
    /// Returns an error if the current working directory cannot be determined
    /// or if the path exists but is not a directory.
    pub async fn resolve_static_dir(&mut self) -> Result<()> {
        let absolute_path = if self.static_dir.is_absolute() {
            self.static_dir.clone()
        } else {
            env::current_dir()
                .context("Failed to get current working directory")?
                .join(&self.static_dir)
        };

        match tokio::fs::canonicalize(&absolute_path).await {
            Ok(canonical_path) => {
                let metadata = tokio::fs::metadata(&canonical_path)
                    .await
                    .with_context(|| {
                        format!("Failed to get metadata for '{}'", canonical_path.display())
                    })?;
                if !metadata.is_dir() {
                    anyhow::bail!(
                        "Static path is not a directory: {}",
                        canonical_path.display()
                    );
                }
                self.static_dir = canonical_path;
                debug!("Resolved static directory to: {}", self.static_dir.display());
            }
            Err(e) => {
                warn!(
                    "Static directory '{}' could not be accessed ({}); only /chat will be served.",
                    absolute_path.display(),
                    e
                );
                self.static_dir = absolute_path;
            }
        }
        Ok(())
    }
}

/// Builds and validates the effective server configuration.
pub async fn load_server_config(args: ServeArgs, section: &ServerSection) -> Result<ServerConfig> {
    let mut config = ServerConfig::merge(args, section);
    config.resolve_static_dir().await?;
    Ok(config)
}
