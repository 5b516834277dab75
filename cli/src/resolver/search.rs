//! # Web Search Strategy
//!
//! File: cli/src/resolver/search.rs
//!
//! ## Overview
//!
//! Looks a query up on the web in two steps:
//! 1. The DuckDuckGo Instant Answer API (JSON). The abstract text wins, then
//!    the direct answer, then the first top-level related topic with text.
//! 2. If that yields nothing (or fails), the DuckDuckGo HTML results page. The
//!    first result with a snippet wins; a result without one contributes its
//!    title.
//!
//! `SearchStrategy` wraps a `WebSearch` for the cascade. The primary search
//! step only accepts answers longer than a configured minimum length, which
//! filters out one-word "answers"; the rephrased step ("explain {query}")
//! accepts anything non-empty.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let web = WebSearch::new(http, &config.endpoints, &config.resolver);
//! let primary = SearchStrategy::new(web.clone()).with_min_answer_len(15);
//! let deeper = SearchStrategy::new(web).rephrased("explain");
//! ```

use super::{Query, Strategy};
use crate::core::config::{EndpointsConfig, ResolverSettings};
use crate::core::error::{AsiaError, Result};
use anyhow::Context;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

static RESULT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.result").expect("valid result selector"));
static RESULT_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid title selector"));
static RESULT_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").expect("valid snippet selector"));

/// Client for the two search endpoints.
#[derive(Clone, Debug)]
pub struct WebSearch {
    http: reqwest::Client,
    instant_answer_url: String,
    text_search_url: String,
    max_results: usize,
}

impl WebSearch {
    pub fn new(http: reqwest::Client, endpoints: &EndpointsConfig, settings: &ResolverSettings) -> Self {
        Self {
            http,
            instant_answer_url: endpoints.instant_answer_url.clone(),
            text_search_url: endpoints.text_search_url.clone(),
            max_results: settings.text_search_max_results,
        }
    }

    /// Instant answer first, text search as the fallback.
    pub async fn lookup(&self, query: &str) -> Result<Option<String>> {
        match self.instant_answer(query).await {
            Ok(Some(answer)) => return Ok(Some(answer)),
            Ok(None) => debug!("No instant answer for '{}', trying text search", query),
            Err(e) => warn!("Instant answer lookup failed: {:#}. Trying text search.", e),
        }
        self.text_search(query).await
    }

    pub async fn instant_answer(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(&self.instant_answer_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .send()
            .await
            .map_err(AsiaError::from)?;

        if !response.status().is_success() {
            return Err(AsiaError::UnexpectedResponse {
                service: "instant-answer".into(),
                detail: format!("status {}", response.status()),
            }
            .into());
        }

        // The API labels its JSON as javascript, so decode the text ourselves.
        let body = response
            .text()
            .await
            .context("Failed to read instant-answer body")?;
        let data: Value =
            serde_json::from_str(&body).context("Failed to parse instant-answer JSON")?;
        Ok(extract_instant_answer(&data))
    }

    pub async fn text_search(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(&self.text_search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(AsiaError::from)?;

        if !response.status().is_success() {
            return Err(AsiaError::UnexpectedResponse {
                service: "text-search".into(),
                detail: format!("status {}", response.status()),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .context("Failed to read text-search body")?;
        Ok(extract_text_result(&body, self.max_results))
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Picks the best field of an Instant Answer response.
pub fn extract_instant_answer(data: &Value) -> Option<String> {
    if let Some(text) = non_empty_str(&data["AbstractText"]) {
        return Some(text);
    }
    if let Some(answer) = non_empty_str(&data["Answer"]) {
        return Some(answer);
    }
    // Nested topic groups carry "Topics" instead of "Text" and are skipped.
    data["RelatedTopics"]
        .as_array()?
        .iter()
        .find_map(|topic| non_empty_str(&topic["Text"]))
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the first usable snippet (or title) among the first `max_results`
/// results of an HTML results page.
pub fn extract_text_result(html: &str, max_results: usize) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .take(max_results)
        .find_map(|result| {
            let snippet = result.select(&RESULT_SNIPPET).next().map(element_text);
            let title = result.select(&RESULT_TITLE).next().map(element_text);
            snippet
                .filter(|s| !s.is_empty())
                .or_else(|| title.filter(|t| !t.is_empty()))
        })
}

/// The search step of the cascade.
pub struct SearchStrategy {
    web: WebSearch,
    min_answer_len: usize,
    prefix: Option<&'static str>,
}

impl SearchStrategy {
    pub fn new(web: WebSearch) -> Self {
        Self {
            web,
            min_answer_len: 0,
            prefix: None,
        }
    }

    /// Only accept answers with more than `len` characters.
    pub fn with_min_answer_len(mut self, len: usize) -> Self {
        self.min_answer_len = len;
        self
    }

    /// Search for "{prefix} {query}" instead of the query itself.
    pub fn rephrased(mut self, prefix: &'static str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    fn search_text(&self, query: &Query) -> String {
        match self.prefix {
            Some(prefix) => format!("{} {}", prefix, query.text()),
            None => query.text().to_string(),
        }
    }
}

#[async_trait]
impl Strategy for SearchStrategy {
    fn name(&self) -> &'static str {
        if self.prefix.is_some() {
            "search-rephrased"
        } else {
            "search"
        }
    }

    async fn answer(&self, query: &Query) -> Result<Option<String>> {
        let text = self.search_text(query);
        let answer = self.web.lookup(&text).await?;
        Ok(answer.filter(|a| {
            let accepted = a.chars().count() > self.min_answer_len;
            if !accepted {
                debug!(
                    "Search answer '{}' is not longer than {} characters, ignoring",
                    a, self.min_answer_len
                );
            }
            accepted
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abstract_text_wins() {
        let data = json!({
            "AbstractText": "Rust is a general-purpose programming language.",
            "Answer": "ignored",
            "RelatedTopics": [{"Text": "ignored too"}]
        });
        assert_eq!(
            extract_instant_answer(&data).as_deref(),
            Some("Rust is a general-purpose programming language.")
        );
    }

    #[test]
    fn test_answer_then_related_topics() {
        let data = json!({"AbstractText": "", "Answer": "42", "RelatedTopics": []});
        assert_eq!(extract_instant_answer(&data).as_deref(), Some("42"));

        let data = json!({
            "AbstractText": "",
            "Answer": "",
            "RelatedTopics": [
                {"Name": "Group", "Topics": [{"Text": "nested"}]},
                {"Text": "", "FirstURL": "https://example.com/a"},
                {"Text": "Ferris - the Rust mascot", "FirstURL": "https://example.com/b"}
            ]
        });
        assert_eq!(
            extract_instant_answer(&data).as_deref(),
            Some("Ferris - the Rust mascot")
        );
    }

    #[test]
    fn test_non_string_answer_is_ignored() {
        let data = json!({"Answer": {"from": "calculator"}, "RelatedTopics": []});
        assert_eq!(extract_instant_answer(&data), None);
    }

    #[test]
    fn test_empty_instant_answer() {
        let data = json!({"AbstractText": "", "Answer": "", "RelatedTopics": []});
        assert_eq!(extract_instant_answer(&data), None);
        assert_eq!(extract_instant_answer(&json!({})), None);
    }

    const RESULTS_PAGE: &str = r##"
        <html><body>
          <div class="result result--ad">
            <a class="result__a" href="#">Sponsored</a>
            <a class="result__snippet">Buy things</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="https://a.example">Only a title</a></h2>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://b.example">Second</a>
            <a class="result__snippet">The <b>second</b>
               result has a snippet.</a>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_first_result_title_when_snippet_missing() {
        assert_eq!(
            extract_text_result(RESULTS_PAGE, 5).as_deref(),
            Some("Only a title")
        );
    }

    #[test]
    fn test_snippet_text_is_normalised() {
        let page = RESULTS_PAGE.replace("Only a title", "");
        assert_eq!(
            extract_text_result(&page, 5).as_deref(),
            Some("The second result has a snippet.")
        );
    }

    #[test]
    fn test_max_results_limits_inspection() {
        let page = RESULTS_PAGE.replace("Only a title", "");
        assert_eq!(extract_text_result(&page, 1), None);
        assert_eq!(extract_text_result("<html></html>", 5), None);
    }

    #[test]
    fn test_rephrased_search_text() {
        let web = WebSearch::new(
            reqwest::Client::new(),
            &EndpointsConfig::default(),
            &ResolverSettings::default(),
        );
        let query = Query::new("  Black holes ");
        assert_eq!(SearchStrategy::new(web.clone()).search_text(&query), "Black holes");
        let deeper = SearchStrategy::new(web).rephrased("explain");
        assert_eq!(deeper.search_text(&query), "explain Black holes");
        assert_eq!(deeper.name(), "search-rephrased");
    }
}
