//! Command-line interface definitions for News Digest.
//!
//! Global options override the matching fields of the settings file. Model
//! options can also come from the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Collect, translate, summarize once and write news_data.json
/// news_digest run
///
/// # Serve the dashboard with the refresh/status API on port 8080
/// news_digest --config digest.yaml serve --static-dir ./web
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path of the persisted news document
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Chat-completion endpoint of the local language model
    #[arg(long, env = "LM_ENDPOINT", global = true)]
    pub lm_endpoint: Option<String>,

    /// Model identifier sent with every completion request
    #[arg(long, env = "LM_MODEL", global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline once in the foreground
    Run,

    /// Serve the dashboard and the refresh/status API
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// Directory holding dashboard.html and its assets
        #[arg(short, long)]
        static_dir: Option<PathBuf>,
    },
}
