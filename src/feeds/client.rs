//! HTTP access to feed endpoints.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::FeedSettings;
use crate::error::FeedError;

/// Fetches the raw body of one feed URL.
///
/// Bodies are returned undecoded: a feed's charset is declared in its XML
/// prolog at least as often as in its `Content-Type`, so decoding is left to
/// the parser. The aggregator only talks to feeds through this trait so tests
/// can serve canned payloads without a network.
pub trait FeedClient {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FeedError>> + Send;
}

/// [`FeedClient`] backed by a shared `reqwest` client.
///
/// Every request carries a browser User-Agent (some publishers block the
/// default one) and is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new(settings: &FeedSettings) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl FeedClient for HttpFeedClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Fetched feed body");
        Ok(body.to_vec())
    }
}
