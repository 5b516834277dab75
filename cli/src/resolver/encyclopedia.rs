//! # Encyclopedia Strategy
//!
//! File: cli/src/resolver/encyclopedia.rs
//!
//! ## Overview
//!
//! Fetches a short plain-text summary from a MediaWiki API (Wikipedia by
//! default). Titles are matched fuzzily: the query is first run through the
//! search API and the spelling suggestion, or else the best hit, is used as
//! the page title. The summary is then limited to a configured number of
//! sentences.
//!
//! Missing pages and disambiguation pages are errors, which the cascade logs
//! before moving on.

use super::{Query, Strategy};
use crate::core::error::{AsiaError, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Deserialize, Debug)]
struct SearchQuery {
    #[serde(default)]
    searchinfo: Option<SearchInfo>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize, Debug)]
struct SearchInfo {
    #[serde(default)]
    suggestion: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize, Debug)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Deserialize, Debug)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize, Debug)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Deserialize, Debug)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

/// Picks the page title for a search response: suggestion first, then the top hit.
fn pick_title(response: SearchResponse) -> Option<String> {
    let query = response.query?;
    let suggestion = query
        .searchinfo
        .and_then(|info| info.suggestion)
        .filter(|s| !s.trim().is_empty());
    suggestion.or_else(|| query.search.into_iter().next().map(|hit| hit.title))
}

/// Turns an extract response into the summary text.
fn summary_from(response: ExtractResponse, title: &str) -> Result<Option<String>> {
    let page = match response.query.and_then(|q| q.pages.into_iter().next()) {
        Some(page) => page,
        None => {
            return Err(AsiaError::UnexpectedResponse {
                service: "encyclopedia".into(),
                detail: format!("no page returned for '{}'", title),
            }
            .into())
        }
    };
    if page.missing {
        return Err(AsiaError::PageNotFound { title: page.title }.into());
    }
    if page
        .pageprops
        .as_ref()
        .is_some_and(|props| props.disambiguation.is_some())
    {
        return Err(AsiaError::Disambiguation { title: page.title }.into());
    }
    Ok(page
        .extract
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// MediaWiki summary client.
#[derive(Clone, Debug)]
pub struct Encyclopedia {
    http: reqwest::Client,
    api_url: String,
    sentences: u32,
}

impl Encyclopedia {
    pub fn new(http: reqwest::Client, api_url: &str, sentences: u32) -> Self {
        Self {
            http,
            api_url: api_url.to_string(),
            sentences,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(AsiaError::from)?;

        if !response.status().is_success() {
            return Err(AsiaError::UnexpectedResponse {
                service: "encyclopedia".into(),
                detail: format!("status {}", response.status()),
            }
            .into());
        }
        response
            .json::<T>()
            .await
            .context("Failed to parse encyclopedia response")
    }

    /// Resolves `query` to a page title using the search suggestion or top hit.
    pub async fn suggest_title(&self, query: &str) -> Result<Option<String>> {
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("srinfo", "suggestion"),
                ("srprop", ""),
            ])
            .await?;
        Ok(pick_title(response))
    }

    /// Summary of `query`, or `None` when nothing matches.
    pub async fn summary(&self, query: &str) -> Result<Option<String>> {
        let title = match self.suggest_title(query).await? {
            Some(title) => title,
            None => {
                debug!("No encyclopedia title matches '{}'", query);
                return Ok(None);
            }
        };
        debug!("Encyclopedia title for '{}': '{}'", query, title);

        let sentences = self.sentences.to_string();
        let response: ExtractResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title.as_str()),
            ])
            .await?;
        summary_from(response, &title)
    }
}

/// The encyclopedia step of the cascade.
pub struct EncyclopediaStrategy {
    encyclopedia: Encyclopedia,
}

impl EncyclopediaStrategy {
    pub fn new(encyclopedia: Encyclopedia) -> Self {
        Self { encyclopedia }
    }
}

#[async_trait]
impl Strategy for EncyclopediaStrategy {
    fn name(&self) -> &'static str {
        "encyclopedia"
    }

    async fn answer(&self, query: &Query) -> Result<Option<String>> {
        self.encyclopedia.summary(query.text()).await
    }
}
