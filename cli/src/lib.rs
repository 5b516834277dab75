//! # ASIA Library
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! ASIA is a small chat backend. A question goes through a cascade of
//! strategies (canned replies, arithmetic, web search, encyclopedia summary)
//! and the first usable answer is returned. The `asia` binary exposes it as
//! an HTTP service (`asia serve`) and as a one-shot command (`asia ask`).
//!
//! The library target exists so integration tests can build the router and
//! resolver in-process.
//!
pub mod commands;
pub mod core;
pub mod resolver;
