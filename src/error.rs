//! Error types for each failure domain of the pipeline.
//!
//! Only [`StoreError`] and [`ConfigError`] ever reach `main`. Feed and model
//! failures are contained by the component that owns the call and degrade to
//! an empty category, an untranslated title or a canned summary.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to turn one feed URL into articles.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Network failure, including the fetch timeout.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed server answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(StatusCode),

    /// The body is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for FeedError {
    fn from(e: quick_xml::Error) -> Self {
        FeedError::Xml(e.to_string())
    }
}

/// Failure of a single chat-completion call.
#[derive(Error, Debug)]
pub enum AskError {
    /// Nothing is listening at the model endpoint, or the connection could
    /// not be established within the connect timeout.
    #[error("language model endpoint unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Response timeout or any other transport failure.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(StatusCode),

    /// The body did not contain a usable first choice.
    #[error("malformed completion: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AskError {
    fn from(e: reqwest::Error) -> Self {
        // A connect-phase timeout reports both `is_connect` and `is_timeout`.
        if e.is_connect() {
            AskError::Unreachable(e)
        } else if e.is_decode() {
            AskError::Malformed(e.to_string())
        } else {
            AskError::Request(e)
        }
    }
}

/// Failure to persist the aggregate document. Fatal for a run.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure to load the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for [`crate::config::Settings`].
    #[error("invalid settings in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
