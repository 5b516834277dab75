//! # ASIA Answer Resolver
//!
//! File: cli/src/resolver/mod.rs
//!
//! ## Overview
//!
//! The resolver turns one free-text query into one answer by trying an ordered
//! list of strategies and returning the first non-empty result:
//!
//! 1. blank input short-circuits to [`EMPTY_QUERY_PROMPT`]
//! 2. canned replies (`canned`)
//! 3. arithmetic and root phrases (`math`)
//! 4. web search, accepted only above a minimum length (`search`)
//! 5. encyclopedia summary (`encyclopedia`)
//! 6. web search again, rephrased as "explain {query}"
//! 7. [`FALLBACK_ANSWER`]
//!
//! ## Architecture
//!
//! Each step implements [`Strategy`]. A strategy answers `Ok(Some(..))`,
//! declines with `Ok(None)`, or fails with `Err(..)`; failures and timeouts are
//! logged and treated exactly like a decline. Nothing escapes
//! [`AnswerResolver::resolve`], which always yields a non-empty string.
//!
//! Every strategy call runs under a `tokio::time::timeout` guard, and every
//! outbound request shares one `reqwest::Client` with its own timeout.
//!
//! The resolver does not use an ambient logger: it carries the `tracing::Span`
//! it was built with and instruments every resolution with it.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let config = asia::core::config::load_config(None)?;
//! let resolver = AnswerResolver::from_config(&config)?;
//! let answer = resolver.resolve("square root of 16").await;
//! assert!(answer.contains("4.0000"));
//! ```

pub mod arithmetic;
pub mod canned;
pub mod encyclopedia;
pub mod math;
pub mod search;

use crate::core::config::Config;
use crate::core::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// Reply to a blank query.
pub const EMPTY_QUERY_PROMPT: &str = "Please send a question.";

/// Reply when no strategy produced an answer.
pub const FALLBACK_ANSWER: &str = "I tried searching everywhere 🕵️‍♂️ but couldn't find a solid answer. Try rephrasing or asking something else!";

/// A trimmed query plus its case-folded form, which is used for matching only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    folded: String,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        let text = raw.trim().to_string();
        let folded = text.to_lowercase();
        Self { text, folded }
    }

    /// The trimmed query as the user typed it.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lower-cased query for pattern matching.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// One step of the cascade.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// `Ok(None)` declines; `Err` is logged by the resolver and also declines.
    async fn answer(&self, query: &Query) -> Result<Option<String>>;
}

/// The answer cascade.
pub struct AnswerResolver {
    strategies: Vec<Box<dyn Strategy>>,
    strategy_timeout: Duration,
    span: Span,
}

impl AnswerResolver {
    /// Creates a resolver over `strategies`, tried in order.
    pub fn new(strategies: Vec<Box<dyn Strategy>>, strategy_timeout: Duration) -> Self {
        Self {
            strategies,
            strategy_timeout,
            span: info_span!("resolver"),
        }
    }

    /// Replaces the span every resolution is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Builds the standard cascade from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = &config.resolver;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        let web = search::WebSearch::new(http.clone(), &config.endpoints, settings);
        let encyclopedia = encyclopedia::Encyclopedia::new(
            http,
            &config.endpoints.encyclopedia_url,
            settings.summary_sentences,
        );

        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(canned::CannedReplies),
            Box::new(math::MathSolver),
            Box::new(
                search::SearchStrategy::new(web.clone())
                    .with_min_answer_len(settings.search_min_answer_len),
            ),
            Box::new(encyclopedia::EncyclopediaStrategy::new(encyclopedia)),
            Box::new(search::SearchStrategy::new(web).rephrased("explain")),
        ];

        Ok(Self::new(strategies, settings.strategy_timeout()))
    }

    /// Names of the configured strategies, in cascade order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolves `raw` to an answer. Never fails and never returns an empty string.
    pub async fn resolve(&self, raw: &str) -> String {
        let span = info_span!(parent: &self.span, "resolve");
        self.resolve_inner(Query::new(raw)).instrument(span).await
    }

    async fn resolve_inner(&self, query: Query) -> String {
        info!("Processing query: {}", query.text());
        if query.is_blank() {
            return EMPTY_QUERY_PROMPT.to_string();
        }

        for strategy in &self.strategies {
            let name = strategy.name();
            match tokio::time::timeout(self.strategy_timeout, strategy.answer(&query)).await {
                Ok(Ok(Some(answer))) if !answer.trim().is_empty() => {
                    info!(strategy = name, "Answered");
                    return answer;
                }
                Ok(Ok(_)) => debug!(strategy = name, "No answer"),
                Ok(Err(e)) => warn!(strategy = name, "Strategy failed: {:#}", e),
                Err(_) => warn!(
                    strategy = name,
                    "Strategy timed out after {:?}", self.strategy_timeout
                ),
            }
        }

        info!("No strategy answered, using fallback");
        FALLBACK_ANSWER.to_string()
    }
}
