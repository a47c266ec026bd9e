//! # News Digest
//!
//! Collects AI news headlines from RSS/Atom feeds, translates foreign titles
//! to Korean and asks a locally hosted language model for a daily briefing.
//! The result is persisted as one JSON document that a static dashboard reads.
//!
//! ## Usage
//!
//! ```sh
//! news_digest run
//! news_digest serve --bind 0.0.0.0:8080 --static-dir ./web
//! ```
//!
//! ## Architecture
//!
//! One refresh is a straight pipeline:
//! 1. **Collecting**: fetch every catalog feed concurrently and keep the newest entries
//! 2. **Translating**: batch foreign titles through the model
//! 3. **Summarizing**: one briefing over every collected headline
//! 4. **Output**: atomically replace `news_data.json`
//!
//! `serve` runs the same pipeline in the background whenever
//! `/api/refresh` is hit.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use futures::FutureExt;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod api;
mod cli;
mod config;
mod error;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod summarize;
mod translate;
mod utils;
mod web;

#[cfg(test)]
mod test_support;

use aggregator::Aggregator;
use api::ChatClient;
use cli::{Cli, Command};
use config::Settings;
use feeds::client::HttpFeedClient;
use outputs::json::ResultStore;
use pipeline::Pipeline;
use utils::ensure_writable_parent;
use web::{Job, JobTrigger};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_cli(&args);
    debug!(?settings, "Effective settings");

    // Early check: the output document must be writable before any work is done
    if let Err(e) = ensure_writable_parent(&settings.output_path).await {
        error!(
            path = %settings.output_path.display(),
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let feed_client = HttpFeedClient::new(&settings.feeds)?;
    let model = Arc::new(ChatClient::new(&settings.lm)?);
    let aggregator = Aggregator::new(feed_client, feeds::default_catalog(), &settings.feeds);
    let pipeline = Pipeline::new(aggregator, model, ResultStore::new(&settings.output_path));

    match args.command {
        Command::Run => {
            let result = pipeline.run().await?;
            println!("[{}] {}", result.updated_at, result.summary);
        }
        Command::Serve { .. } => {
            let store = pipeline.store().clone();
            let pipeline = Arc::new(pipeline);
            let job: Job = Arc::new(move || {
                let pipeline = pipeline.clone();
                async move { pipeline.run().await.map(|_| ()) }.boxed()
            });
            let trigger = Arc::new(JobTrigger::new(job, store));
            let router = web::create_router(
                trigger,
                &settings.server.static_dir,
                &settings.output_path,
            );
            web::serve(router, &settings.server.bind).await?;
        }
    }

    Ok(())
}
