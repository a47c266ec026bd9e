//! Runtime settings.
//!
//! Settings come from an optional YAML file; any field left out keeps its
//! default. Command-line flags are applied on top by [`Settings::apply_cli`].
//!
//! ```yaml
//! output_path: /var/lib/news/news_data.json
//! lm:
//!   endpoint: http://localhost:1234/v1/chat/completions
//!   model: qwen2.5-7b-instruct
//! feeds:
//!   per_source: 5
//!   concurrency: 4
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LmSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Bound on establishing the connection; a model that is not running
    /// should be reported quickly rather than after `timeout_secs`.
    pub connect_timeout_secs: u64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".to_string(),
            model: "local-model".to_string(),
            timeout_secs: 120,
            connect_timeout_secs: 5,
        }
    }
}

/// Feed collection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Maximum articles kept per source.
    pub per_source: usize,
    pub timeout_secs: u64,
    /// Sources fetched at the same time.
    pub concurrency: usize,
    pub search_endpoint: String,
    pub user_agent: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            per_source: 5,
            timeout_secs: 10,
            concurrency: 4,
            search_endpoint: "https://news.google.com/rss/search".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string(),
        }
    }
}

/// Dashboard server settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the aggregate document is written.
    pub output_path: PathBuf,
    pub lm: LmSettings,
    pub feeds: FeedSettings,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("news_data.json"),
            lm: LmSettings::default(),
            feeds: FeedSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "Loaded settings");
        Ok(settings)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to `null`, which is not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Override fields with whatever was given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
        if let Some(endpoint) = &cli.lm_endpoint {
            self.lm.endpoint = endpoint.clone();
        }
        if let Some(model) = &cli.model {
            self.lm.model = model.clone();
        }
        if let crate::cli::Command::Serve { bind, static_dir } = &cli.command {
            if let Some(bind) = bind {
                self.server.bind = bind.clone();
            }
            if let Some(dir) = static_dir {
                self.server.static_dir = dir.clone();
            }
        }
    }
}
