//! # ASIA Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the commands and the resolver:
//! - `config`: layered configuration loading, merging and validation
//! - `error`: the `AsiaError` domain errors and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{AsiaError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
