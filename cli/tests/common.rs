//! # ASIA Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`:
//! - `asia_cmd()` for driving the compiled binary with `assert_cmd`
//! - configurations that point every upstream at an unreachable address
//! - a fake upstream server that imitates the search and encyclopedia APIs,
//!   so the whole cascade can run without network access
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;

use asia::core::config::Config;
use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Nothing listens on port 1, so connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn asia_cmd() -> Command {
    Command::cargo_bin("asia").expect("Failed to find asia binary for testing")
}

/// Configuration whose endpoints all refuse connections.
pub fn unreachable_config() -> Config {
    let mut config = Config::default();
    config.resolver.request_timeout_secs = 2;
    config.resolver.strategy_timeout_secs = 3;
    config.endpoints.instant_answer_url = format!("{}/ia", UNREACHABLE);
    config.endpoints.text_search_url = format!("{}/html/", UNREACHABLE);
    config.endpoints.encyclopedia_url = format!("{}/w/api.php", UNREACHABLE);
    config
}

/// Writes the TOML form of `unreachable_config` to `dir` and returns its path.
pub fn write_unreachable_config(dir: &Path) -> PathBuf {
    let path = dir.join("asia.toml");
    let toml = format!(
        r#"
[resolver]
request_timeout_secs = 2
strategy_timeout_secs = 3

[endpoints]
instant_answer_url = "{base}/ia"
text_search_url = "{base}/html/"
encyclopedia_url = "{base}/w/api.php"
"#,
        base = UNREACHABLE
    );
    std::fs::write(&path, toml).expect("Failed to write test config");
    path
}

/// Configuration pointing at a fake upstream started with `spawn_fake_upstream`.
pub fn upstream_config(addr: SocketAddr) -> Config {
    let mut config = Config::default();
    config.resolver.request_timeout_secs = 2;
    config.resolver.strategy_timeout_secs = 3;
    config.endpoints.instant_answer_url = format!("http://{}/ia", addr);
    config.endpoints.text_search_url = format!("http://{}/html/", addr);
    config.endpoints.encyclopedia_url = format!("http://{}/w/api.php", addr);
    config
}

fn param(params: &HashMap<String, String>, key: &str) -> String {
    params
        .get(key)
        .map(|v| v.to_lowercase())
        .unwrap_or_default()
}

async fn instant_answer(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = param(&params, "q");
    let body = match q.as_str() {
        "rust language" => json!({
            "AbstractText": "Rust is a general-purpose programming language emphasizing performance and memory safety.",
            "Answer": "",
            "RelatedTopics": []
        }),
        "10 / 0" => json!({
            "AbstractText": "Division by zero has no defined value in ordinary arithmetic.",
            "Answer": "",
            "RelatedTopics": []
        }),
        // Too short for the first search step.
        "capital of peru" => json!({"AbstractText": "", "Answer": "Lima", "RelatedTopics": []}),
        _ => json!({"AbstractText": "", "Answer": "", "RelatedTopics": []}),
    };
    Json(body)
}

async fn text_search(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    let q = param(&params, "q");
    if q.contains("peru") {
        Html(
            r#"<html><body>
                 <div class="result results_links">
                   <a class="result__a" href="https://example.org/lima">Lima</a>
                   <a class="result__snippet">Lima is the capital and largest city of Peru.</a>
                 </div>
               </body></html>"#
                .to_string(),
        )
    } else {
        Html("<html><body><div class=\"no-results\"></div></body></html>".to_string())
    }
}

async fn encyclopedia(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("list").map(String::as_str) == Some("search") {
        let q = param(&params, "srsearch");
        let body = if q.contains("einstien") {
            json!({"query": {"searchinfo": {"suggestion": "albert einstein"}, "search": []}})
        } else if q == "mercury" {
            json!({"query": {"search": [{"ns": 0, "title": "Mercury"}]}})
        } else {
            json!({"query": {"searchinfo": {"totalhits": 0}, "search": []}})
        };
        return Json(body);
    }

    let title = param(&params, "titles");
    let page = match title.as_str() {
        "albert einstein" => json!({
            "pageid": 736,
            "title": "Albert Einstein",
            "extract": "Albert Einstein was a German-born theoretical physicist. He developed the theory of relativity. He received the 1921 Nobel Prize in Physics."
        }),
        "mercury" => json!({
            "pageid": 19694,
            "title": "Mercury",
            "extract": "Mercury may refer to:",
            "pageprops": {"disambiguation": ""}
        }),
        _ => json!({"title": title, "missing": true}),
    };
    Json(json!({"batchcomplete": true, "query": {"pages": [page]}}))
}

/// Starts the fake upstream on an ephemeral port and returns its address.
pub async fn spawn_fake_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/ia", get(instant_answer))
        .route("/html/", get(text_search))
        .route("/w/api.php", get(encyclopedia));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake upstream");
    let addr = listener.local_addr().expect("Fake upstream has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}
