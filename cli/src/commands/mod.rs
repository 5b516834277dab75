//! # ASIA Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The top-level commands of the `asia` CLI. Each module defines its own
//! argument struct and a `handle_*` function that `main.rs` dispatches to.
//!
//! ## Command Groups
//!
//! - `ask`: answer one question on the command line
//! - `serve`: run the chat UI and `/chat` endpoint
//!

/// One-shot question answering. Prints the answer to stdout.
pub mod ask;
/// The HTTP chat server. Includes configuration, handlers and server logic.
pub mod serve;
