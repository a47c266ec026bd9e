//! Feed sources and the code that turns them into articles.
//!
//! # Catalog
//!
//! | Kind | Count | Resolved through |
//! |------|-------|------------------|
//! | Query (ko) | 5 | news search endpoint, Korean locale |
//! | Query (en) | 3 | news search endpoint, English locale |
//! | Direct | 6 | the publisher's own RSS/Atom feed |
//!
//! # Submodules
//!
//! - [`client`]: HTTP fetch of one feed URL
//! - [`parser`]: RSS 2.0 / Atom payload parsing

pub mod client;
pub mod parser;

use crate::models::{FeedSource, Locale};

/// The compiled-in source catalog, in display order.
pub fn default_catalog() -> Vec<FeedSource> {
    vec![
        FeedSource::query("최신 AI 뉴스", "AI 인공지능", Locale::Ko),
        FeedSource::query("ChatGPT/GPT", "ChatGPT GPT", Locale::Ko),
        FeedSource::query("LLM", "LLM Claude Gemini 대규모언어모델", Locale::Ko),
        FeedSource::query("AI 연구", "AI연구 딥러닝 머신러닝", Locale::Ko),
        FeedSource::query("AI 산업", "AI기업 AI투자 AI스타트업", Locale::Ko),
        FeedSource::query("AI Global", "artificial intelligence AI", Locale::En),
        FeedSource::query("OpenAI & GPT", "OpenAI GPT ChatGPT", Locale::En),
        FeedSource::query("AI Research", "AI research deep learning LLM", Locale::En),
        FeedSource::direct(
            "TechCrunch AI",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
        FeedSource::direct(
            "The Verge AI",
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
        ),
        FeedSource::direct(
            "Ars Technica",
            "https://feeds.arstechnica.com/arstechnica/technology-lab",
        ),
        FeedSource::direct("MIT Tech Review", "https://www.technologyreview.com/feed/"),
        FeedSource::direct("VentureBeat AI", "https://venturebeat.com/category/ai/feed/"),
        FeedSource::direct("Wired AI", "https://www.wired.com/feed/tag/ai/latest/rss"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 14);

        let (queries, directs): (Vec<_>, Vec<_>) = catalog
            .iter()
            .partition(|s| matches!(s, FeedSource::Query { .. }));
        assert_eq!(queries.len(), 8);
        assert_eq!(directs.len(), 6);

        let english = catalog
            .iter()
            .filter(|s| matches!(s, FeedSource::Query { locale: Locale::En, .. }))
            .count();
        assert_eq!(english, 3);
    }

    #[test]
    fn test_default_catalog_labels_are_unique() {
        let catalog = default_catalog();
        assert_eq!(catalog.iter().map(FeedSource::label).unique().count(), catalog.len());
    }

    #[test]
    fn test_query_sources_come_first() {
        let catalog = default_catalog();
        assert_eq!(catalog[0].label(), "최신 AI 뉴스");
        assert_eq!(catalog[8].label(), "TechCrunch AI");
    }
}
