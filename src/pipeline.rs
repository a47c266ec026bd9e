//! One refresh run: collect → translate → summarize → persist.
//!
//! Stages run one after another. Feed and model failures are absorbed by the
//! stage that hits them; only a failure to persist ends the run with an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{info, instrument};

use crate::aggregator::Aggregator;
use crate::api::AskAsync;
use crate::error::StoreError;
use crate::feeds::client::FeedClient;
use crate::models::{AggregateResult, Article};
use crate::outputs::json::ResultStore;
use crate::summarize::Summarizer;
use crate::translate::TitleTranslator;
use crate::utils::format_timestamp;

#[derive(Debug)]
pub struct Pipeline<C, M> {
    aggregator: Aggregator<C>,
    translator: TitleTranslator<M>,
    summarizer: Summarizer<M>,
    store: ResultStore,
}

impl<C, M> Pipeline<C, M>
where
    C: FeedClient + Sync,
    M: AskAsync + Send + Sync,
{
    pub fn new(aggregator: Aggregator<C>, model: Arc<M>, store: ResultStore) -> Self {
        Self {
            aggregator,
            translator: TitleTranslator::new(model.clone()),
            summarizer: Summarizer::new(model),
            store,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Execute one full run and return what was persisted.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<AggregateResult, StoreError> {
        let t0 = Instant::now();
        let updated_at = format_timestamp(Local::now());
        info!(%updated_at, sources = self.aggregator.catalog().len(), "News refresh starting");

        let mut categories = self.aggregator.collect().await;

        let flat: Vec<&mut Article> = categories
            .iter_mut()
            .flat_map(|c| c.articles.iter_mut())
            .collect();
        info!(articles = flat.len(), "Translating foreign titles");
        self.translator.translate(flat).await;

        let all: Vec<&Article> = categories.iter().flat_map(|c| c.articles.iter()).collect();
        info!(articles = all.len(), "Summarizing");
        let summary = self.summarizer.summarize(&all).await;

        let result = AggregateResult {
            updated_at,
            categories,
            summary,
        };
        self.store.write(&result).await?;

        let elapsed = t0.elapsed();
        info!(
            path = %self.store.path().display(),
            articles = result.article_count(),
            secs = elapsed.as_secs(),
            millis = elapsed.subsec_millis(),
            "News refresh complete"
        );
        Ok(result)
    }
}
