//! Data models for collected headlines and the persisted digest.
//!
//! - [`Article`]: one normalized headline from any feed
//! - [`Category`]: the articles contributed by one catalog source
//! - [`AggregateResult`]: the document written to disk after every run
//! - [`FeedSource`] / [`Locale`]: entries of the source catalog

use serde::{Deserialize, Serialize};

/// A normalized headline.
///
/// Only `title` ever changes after parsing, when the translator rewrites a
/// foreign-language headline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Headline text. Never empty.
    pub title: String,
    /// Link to the full story.
    pub link: String,
    /// Publisher or source label.
    pub source: String,
    /// Publication timestamp exactly as the feed wrote it.
    #[serde(rename = "date")]
    pub published_at: String,
}

/// Articles collected from one catalog source, in feed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub name: String,
    pub articles: Vec<Article>,
}

/// The persisted unit. Each run replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AggregateResult {
    /// Local run start time, `%Y-%m-%d %H:%M`.
    pub updated_at: String,
    /// One entry per catalog source, in catalog order.
    pub categories: Vec<Category>,
    /// Narrative digest of every article, or a degraded-mode message.
    pub summary: String,
}

impl AggregateResult {
    /// Number of articles across all categories.
    pub fn article_count(&self) -> usize {
        self.categories.iter().map(|c| c.articles.len()).sum()
    }
}

/// Language/region pair passed to the news search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    /// `hl`, `gl` and `ceid` query parameters for this locale.
    pub fn search_params(self) -> &'static str {
        match self {
            Locale::Ko => "hl=ko&gl=KR&ceid=KR:ko",
            Locale::En => "hl=en&gl=US&ceid=US:en",
        }
    }
}

/// One entry of the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum FeedSource {
    /// A topic resolved through the news search endpoint.
    Query {
        label: String,
        query: String,
        locale: Locale,
    },
    /// A publisher's own RSS or Atom feed.
    Direct { label: String, url: String },
}

impl FeedSource {
    pub fn query(label: &str, query: &str, locale: Locale) -> Self {
        FeedSource::Query {
            label: label.to_string(),
            query: query.to_string(),
            locale,
        }
    }

    pub fn direct(label: &str, url: &str) -> Self {
        FeedSource::Direct {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    /// Category name this source contributes.
    pub fn label(&self) -> &str {
        match self {
            FeedSource::Query { label, .. } | FeedSource::Direct { label, .. } => label,
        }
    }

    /// URL to fetch. Query sources are expanded against `search_endpoint`.
    pub fn feed_url(&self, search_endpoint: &str) -> String {
        match self {
            FeedSource::Query { query, locale, .. } => format!(
                "{}?q={}&{}",
                search_endpoint,
                urlencoding::encode(query),
                locale.search_params()
            ),
            FeedSource::Direct { url, .. } => url.clone(),
        }
    }
}
