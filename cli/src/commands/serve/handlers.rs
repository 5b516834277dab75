//! # ASIA Chat Handlers
//!
//! File: cli/src/commands/serve/handlers.rs
//!
//! ## Overview
//!
//! The `POST /chat` endpoint. The request body is `{"message": "..."}` and the
//! reply is always `{"response": "..."}`:
//!
//! - a blank, missing or unreadable message gets [`EMPTY_MESSAGE_PROMPT`]
//!   with status 200;
//! - anything else is handed to the [`AnswerResolver`] and its answer is
//!   returned with status 200;
//! - if resolution dies unexpectedly the reply is [`INTERNAL_ERROR_MESSAGE`]
//!   with status 500.
//!
//! ## Architecture
//!
//! The resolver is shared through [`AppState`]. Each resolution runs in its
//! own task so that a panic inside a strategy surfaces as a `JoinError`,
//! which [`ApiError`] turns into the 500 reply instead of a dropped
//! connection. The task is aborted if the client goes away first.

use crate::resolver::AnswerResolver;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Reply to a request without a usable message.
pub const EMPTY_MESSAGE_PROMPT: &str = "Please type a question so I can reply!";

/// Reply body for unexpected failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<AnswerResolver>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Failures that end a chat request with a 500.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("answer resolution aborted: {0}")]
    Resolver(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Chat request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse::new(INTERNAL_ERROR_MESSAGE)),
        )
            .into_response()
    }
}

/// Aborts the wrapped task when dropped, e.g. when axum drops the handler
/// future because the client disconnected.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        if !self.0.is_finished() {
            debug!("Chat request dropped, aborting answer resolution");
            self.0.abort();
        }
    }
}

/// # Chat Handler (`chat`)
///
/// Answers one chat message. Malformed JSON is not an error for the client:
/// it is logged and treated as an empty message.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = match payload {
        Ok(Json(request)) => request.message,
        Err(rejection) => {
            warn!("Unreadable chat request body: {}", rejection.body_text());
            String::new()
        }
    };

    let message = message.trim().to_string();
    if message.is_empty() {
        return Ok(Json(ChatResponse::new(EMPTY_MESSAGE_PROMPT)));
    }

    let resolver = Arc::clone(&state.resolver);
    let mut task = AbortOnDrop(tokio::spawn(async move {
        resolver.resolve(&message).await
    }));
    let answer = (&mut task.0).await?;
    Ok(Json(ChatResponse::new(answer)))
}
