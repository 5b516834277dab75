//! # ASIA Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `asia` CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading the layered configuration once
//! - Routing execution to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Run the chat server on $PORT or 5001
//! asia serve
//!
//! # Answer one question with debug logging
//! asia -vv ask what is the capital of peru
//!
//! # Use an explicit configuration file
//! asia --config ./asia.toml serve
//! ```
//!
use asia::commands;
use asia::core::config;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "asia",
    about = "💬 ASIA: a chat backend that answers questions",
    long_about = "Answers free-text questions through canned replies, arithmetic,\n\
                  web search and encyclopedia summaries. Serve it over HTTP or ask from the shell.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file to use instead of `.asia.toml` and the user config.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Run the chat UI and the /chat endpoint.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Answer a single question and print the reply.
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match config::load_config(cli.config.as_deref()) {
        Ok(app_config) => match cli.command {
            Commands::Serve(args) => commands::serve::handle_serve(args, &app_config).await,
            Commands::Ask(args) => commands::ask::handle_ask(args, &app_config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
