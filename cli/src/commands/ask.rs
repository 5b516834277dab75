//! # ASIA Ask Command
//!
//! File: cli/src/commands/ask.rs
//!
//! ## Overview
//!
//! `asia ask <question...>` runs the same answer cascade as `/chat` once and
//! prints the answer to stdout. Useful for checking configuration and
//! upstream endpoints without starting the server.
//!
//! ## Examples
//!
//! ```bash
//! asia ask 2 + 2
//! asia ask "square root of 16"
//! asia -v ask who is ada lovelace
//! ```
//!
use crate::core::config::Config;
use crate::core::error::Result;
use crate::resolver::AnswerResolver;
use clap::Parser;
use tracing::{debug, info_span};

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
}

impl AskArgs {
    pub fn question(&self) -> String {
        self.query.join(" ")
    }
}

pub async fn handle_ask(args: AskArgs, config: &Config) -> Result<()> {
    let question = args.question();
    debug!("Asking: {}", question);

    let resolver =
        AnswerResolver::from_config(config)?.with_span(info_span!("resolver", mode = "ask"));
    let answer = resolver.resolve(&question).await;
    println!("{}", answer);
    Ok(())
}
