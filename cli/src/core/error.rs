//! # ASIA Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout ASIA. Two layers are
//! used, the same way everywhere in the crate:
//! - `AsiaError`: a `thiserror` enum naming the domain failures (configuration,
//!   upstream HTTP calls, unexpected upstream payloads, arithmetic).
//! - `Result<T>`: an alias for `anyhow::Result<T>` so callers can attach
//!   context with `.context(..)` while still being able to downcast to
//!   `AsiaError` when they care about the specific case.
//!
//! Strategy failures never reach the user: the resolver logs them and moves on
//! to the next strategy. The HTTP boundary has its own `ApiError` (see
//! `commands::serve::handlers`) for the one failure that does reach the caller.
//!
//! ## Examples
//!
//! ```rust,ignore
//! // Return a specific error type
//! if page.missing {
//!     return Err(AsiaError::PageNotFound { title: title.to_string() }.into());
//! }
//!
//! // Add context to errors using anyhow
//! let body = response.text().await.context("Failed to read instant-answer body")?;
//! ```
//!
use crate::resolver::arithmetic::EvalError;
use thiserror::Error;

/// Custom error type for the ASIA application.
#[derive(Error, Debug)]
pub enum AsiaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {service}: {detail}")]
    UnexpectedResponse { service: String, detail: String },

    #[error("No encyclopedia page matches '{title}'.")]
    PageNotFound { title: String },

    #[error("'{title}' is a disambiguation page.")]
    Disambiguation { title: String },

    #[error("Arithmetic evaluation failed: {source}")]
    Arithmetic {
        #[from]
        source: EvalError,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
