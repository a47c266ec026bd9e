//! Collects one category per catalog source.
//!
//! Sources are fetched concurrently, at most `concurrency` at a time, and
//! reassembled in catalog order. A source that fails for any reason still
//! contributes its category, just with no articles.

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::FeedSettings;
use crate::error::FeedError;
use crate::feeds::client::FeedClient;
use crate::feeds::parser::{FeedEntry, parse_feed_bytes};
use crate::models::{Article, Category, FeedSource};

#[derive(Debug)]
pub struct Aggregator<C> {
    client: C,
    catalog: Vec<FeedSource>,
    per_source: usize,
    concurrency: usize,
    search_endpoint: String,
}

impl<C: FeedClient + Sync> Aggregator<C> {
    pub fn new(client: C, catalog: Vec<FeedSource>, settings: &FeedSettings) -> Self {
        Self {
            client,
            catalog,
            per_source: settings.per_source,
            concurrency: settings.concurrency.max(1),
            search_endpoint: settings.search_endpoint.clone(),
        }
    }

    pub fn catalog(&self) -> &[FeedSource] {
        &self.catalog
    }

    /// Fetch every source; one category per catalog entry, in catalog order.
    #[instrument(level = "info", skip_all, fields(sources = self.catalog.len()))]
    pub async fn collect(&self) -> Vec<Category> {
        let pending: Vec<_> = self
            .catalog
            .iter()
            .map(|source| self.collect_source(source))
            .collect();
        let categories: Vec<Category> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let total: usize = categories.iter().map(|c| c.articles.len()).sum();
        info!(categories = categories.len(), total, "Collected all sources");
        categories
    }

    async fn collect_source(&self, source: &FeedSource) -> Category {
        let url = source.feed_url(&self.search_endpoint);
        let articles = match self.fetch_source(source, &url).await {
            Ok(articles) => {
                info!(category = source.label(), count = articles.len(), "Collected feed");
                articles
            }
            Err(e) => {
                warn!(category = source.label(), %url, error = %e, "Feed collection failed; category left empty");
                Vec::new()
            }
        };

        Category {
            name: source.label().to_string(),
            articles,
        }
    }

    async fn fetch_source(&self, source: &FeedSource, url: &str) -> Result<Vec<Article>, FeedError> {
        let body = self.client.fetch(url).await?;
        let entries = parse_feed_bytes(&body, self.per_source)?;
        let base = Url::parse(url).ok();
        Ok(entries
            .into_iter()
            .map(|entry| to_article(source, base.as_ref(), entry))
            .collect())
    }
}

fn to_article(source: &FeedSource, base: Option<&Url>, entry: FeedEntry) -> Article {
    let source_name = match source {
        FeedSource::Query { label, .. } => entry.publisher.unwrap_or_else(|| label.clone()),
        FeedSource::Direct { label, .. } => label.clone(),
    };
    Article {
        title: entry.title,
        link: resolve_link(base, entry.link),
        source: source_name,
        published_at: entry.published_at,
    }
}

/// Resolve a relative link against the feed URL; absolute links pass through.
fn resolve_link(base: Option<&Url>, link: String) -> String {
    if link.is_empty() || Url::parse(&link).is_ok() {
        return link;
    }
    match base.and_then(|b| b.join(&link).ok()) {
        Some(resolved) => resolved.to_string(),
        None => link,
    }
}
