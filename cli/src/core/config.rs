//! # ASIA Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements loading, merging and validation of the ASIA
//! configuration. Everything has a built-in default, so ASIA runs with no
//! configuration file at all; files only override what they name.
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit `--config <file>` (disables the discovery below)
//! 2. Project-specific `.asia.toml` in the current directory or an ancestor
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! Command-line flags (and `$PORT`) are applied on top of the result by the
//! `serve` command, see `commands::serve::config`.
//!
//! ## Examples
//!
//! ```toml
//! [server]
//! port = 5001
//! static_dir = "~/asia/static"
//!
//! [resolver]
//! search_min_answer_len = 15
//! summary_sentences = 3
//!
//! [endpoints]
//! encyclopedia_url = "https://de.wikipedia.org/w/api.php"
//! ```
//!
use crate::core::error::{AsiaError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use toml::Table;
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// HTTP server settings (`asia serve`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerSection {
    /// Interface to bind to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the chat UI and its assets (can use ~). Will be expanded.
    pub static_dir: String,
    /// File served for `GET /`.
    pub index_file: String,
    /// Send permissive CORS headers.
    pub enable_cors: bool,
}

/// Thresholds and limits used by the answer cascade.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ResolverSettings {
    /// Timeout applied to every outbound HTTP request.
    pub request_timeout_secs: u64,
    /// Upper bound for a single strategy, however many requests it makes.
    pub strategy_timeout_secs: u64,
    /// A search answer must be longer than this many characters to be accepted.
    pub search_min_answer_len: usize,
    /// Sentence count requested from the encyclopedia.
    pub summary_sentences: u32,
    /// How many text-search results are inspected.
    pub text_search_max_results: usize,
    /// User-Agent sent with outbound requests.
    pub user_agent: String,
}

/// Base URLs of the external services.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct EndpointsConfig {
    pub instant_answer_url: String,
    pub text_search_url: String,
    pub encyclopedia_url: String,
}

pub const DEFAULT_PORT: u16 = 5001;

/// The chat UI bundled with the crate, so `asia serve` works from any
/// working directory of a source checkout.
pub const BUNDLED_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

fn default_static_dir() -> String {
    BUNDLED_STATIC_DIR.to_string()
}
fn default_index_file() -> String {
    "index.html".to_string()
}
fn default_user_agent() -> String {
    format!("asia/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: default_static_dir(),
            index_file: default_index_file(),
            enable_cors: true,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 6,
            strategy_timeout_secs: 10,
            search_min_answer_len: 15,
            summary_sentences: 3,
            text_search_max_results: 5,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            instant_answer_url: "https://api.duckduckgo.com/".to_string(),
            text_search_url: "https://html.duckduckgo.com/html/".to_string(),
            encyclopedia_url: "https://en.wikipedia.org/w/api.php".to_string(),
        }
    }
}

impl ResolverSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_secs(self.strategy_timeout_secs)
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".asia.toml";

/// Loads the effective configuration.
///
/// With `explicit` set, only that file is read (it must exist). Otherwise the
/// user and project files are discovered and merged over the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut merged_config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            let user_table = load_user_config()?;
            let project_table = load_project_config()?;
            config_from_table(merge_tables(
                user_table.unwrap_or_default(),
                project_table,
            ))
            .context("Failed to apply merged configuration")?
        }
    };
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Table>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "ASIA", "asia") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            read_table(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Table>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        read_table(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.asia.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks from `start` towards the filesystem root looking for `.asia.toml`,
/// stopping at the first directory that contains `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    content
        .parse::<Table>()
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn config_from_table(table: Table) -> Result<Config> {
    Ok(toml::Value::Table(table).try_into::<Config>()?)
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let table = read_table(path)?;
    config_from_table(table)
        .with_context(|| format!("Invalid configuration in file: {}", path.display()))
}

/// Overlays `project` on `user`. A key present in the project file wins even
/// when its value equals the built-in default; nested tables merge per key.
fn merge_tables(mut user: Table, project: Option<Table>) -> Table {
    let Some(project) = project else {
        return user;
    };
    for (key, value) in project {
        let merged = match (user.remove(&key), value) {
            (Some(toml::Value::Table(base)), toml::Value::Table(overlay)) => {
                toml::Value::Table(merge_tables(base, Some(overlay)))
            }
            (_, value) => value,
        };
        user.insert(key, merged);
    }
    user
}

fn expand_config_paths(config: &mut Config) {
    config.server.static_dir = shellexpand::tilde(&config.server.static_dir).into_owned();
    debug!("Expanded static directory: {}", config.server.static_dir);
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    let resolver = &config.resolver;
    if resolver.request_timeout_secs == 0 || resolver.strategy_timeout_secs == 0 {
        return Err(anyhow!(AsiaError::Config(
            "Timeouts in [resolver] must be greater than zero.".to_string()
        )));
    }
    if resolver.summary_sentences == 0 {
        return Err(anyhow!(AsiaError::Config(
            "summary_sentences must be at least 1.".to_string()
        )));
    }
    if resolver.text_search_max_results == 0 {
        return Err(anyhow!(AsiaError::Config(
            "text_search_max_results must be at least 1.".to_string()
        )));
    }
    if config.server.index_file.trim().is_empty() {
        return Err(anyhow!(AsiaError::Config(
            "index_file cannot be empty.".to_string()
        )));
    }
    let endpoints = [
        ("instant_answer_url", &config.endpoints.instant_answer_url),
        ("text_search_url", &config.endpoints.text_search_url),
        ("encyclopedia_url", &config.endpoints.encyclopedia_url),
    ];
    for (name, url) in endpoints {
        if let Err(e) = reqwest::Url::parse(url) {
            return Err(anyhow!(AsiaError::Config(format!(
                "Invalid URL for {}: '{}' ({}).",
                name, url, e
            ))));
        }
    }
    debug!("Configuration validation successful.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_content = r#"
            [server]
            port = 9000
            static_dir = "~/asia-ui"

            [resolver]
            summary_sentences = 5
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.static_dir, "~/asia-ui"); // Not yet expanded
        assert_eq!(config.server.index_file, "index.html"); // Default
        assert!(config.server.enable_cors);
        assert_eq!(config.resolver.summary_sentences, 5);
        assert_eq!(config.resolver.search_min_answer_len, 15); // Default
        assert_eq!(config.endpoints, EndpointsConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[server]\nprot = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.resolver.request_timeout(), Duration::from_secs(6));
        assert_eq!(config.resolver.summary_sentences, 3);
        assert!(config.resolver.user_agent.starts_with("asia/"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_static_dir_holds_chat_ui() {
        let config = Config::default();
        let static_dir = Path::new(&config.server.static_dir);
        assert!(static_dir.is_absolute());
        assert!(static_dir.join(&config.server.index_file).is_file());
        assert!(static_dir.join("app.js").is_file());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config::default();
        config.server.static_dir = "~/asia_static".to_string();

        expand_config_paths(&mut config);

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.server.static_dir,
            home_dir.join("asia_static").to_string_lossy()
        );
    }

    fn table(toml: &str) -> Table {
        toml.parse::<Table>().expect("Failed to parse TOML")
    }

    #[test]
    fn test_merge_project_overrides_user() {
        let user = table("[server]\nport = 7000\n[resolver]\nsummary_sentences = 2\n");
        let project = table("[server]\nport = 8080\n");

        let merged = config_from_table(merge_tables(user, Some(project))).unwrap();
        assert_eq!(merged.server.port, 8080); // Project wins
        assert_eq!(merged.resolver.summary_sentences, 2); // Not in project, user kept
    }

    #[test]
    fn test_merge_project_value_equal_to_default_still_wins() {
        let user = table("[server]\nport = 7000\nenable_cors = false\n");
        let project = table("[server]\nport = 5001\n");

        let merged = config_from_table(merge_tables(user, Some(project))).unwrap();
        assert_eq!(merged.server.port, DEFAULT_PORT);
        assert!(!merged.server.enable_cors);
    }

    #[test]
    fn test_merge_without_project() {
        let user = table("[endpoints]\nencyclopedia_url = \"https://de.wikipedia.org/w/api.php\"\n");
        let merged = config_from_table(merge_tables(user, None)).unwrap();
        assert_eq!(
            merged.endpoints.encyclopedia_url,
            "https://de.wikipedia.org/w/api.php"
        );
        assert_eq!(merged.server, ServerSection::default());
    }

    #[test]
    fn test_merged_unknown_field_rejected() {
        let user = table("[server]\nport = 7000\n");
        let project = table("[server]\nprot = 1\n");
        assert!(config_from_table(merge_tables(user, Some(project))).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.resolver.request_timeout_secs = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Timeouts"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.endpoints.text_search_url = "not a url".into();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("text_search_url"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("asia.toml");
        fs::write(
            &path,
            "[endpoints]\ninstant_answer_url = \"http://127.0.0.1:9/\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.endpoints.instant_answer_url, "http://127.0.0.1:9/");
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_load_explicit_file_missing() {
        let temp_dir = tempdir().unwrap();
        let result = load_config(Some(&temp_dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_find_project_config_in_ancestor() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();

        let found = find_project_config_path(&nested);
        assert_eq!(found, Some(temp_dir.path().join(PROJECT_CONFIG_FILENAME)));
    }

    #[test]
    fn test_find_project_config_stops_at_git() {
        let temp_dir = tempdir().unwrap();
        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();

        assert_eq!(find_project_config_path(&repo), None);
    }
}
