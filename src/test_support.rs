//! Fakes for the two I/O seams, shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::api::{AskAsync, Prompt};
use crate::error::{AskError, FeedError};
use crate::feeds::client::FeedClient;
use crate::models::Article;

pub fn article(title: &str) -> Article {
    Article {
        title: title.to_string(),
        link: format!("https://example.com/{}", title.len()),
        source: "Example".to_string(),
        published_at: "Mon, 06 May 2025 10:00:00 GMT".to_string(),
    }
}

/// RSS document with `n` items titled `"{prefix} {i}"`.
pub fn rss_with_items(prefix: &str, n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| {
            format!(
                "<item><title>{prefix} {i}</title><link>https://example.com/{i}</link>\
                 <pubDate>Mon, 06 May 2025 0{i}:00:00 GMT</pubDate>\
                 <source url=\"https://pub.example\">Publisher {i}</source></item>"
            )
        })
        .collect();
    format!("<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>{items}</channel></rss>")
}

/// Answers prompts from a fixed script, recording each prompt.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, AskError>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, AskError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl AskAsync for ScriptedModel {
    fn ask(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AskError>> + Send {
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AskError::Malformed("script exhausted".to_string())));
        std::future::ready(reply)
    }
}

/// Canned response for one feed URL.
#[derive(Debug, Clone)]
pub enum Canned {
    Body(String),
    Status(StatusCode),
}

/// Serves canned feed bodies by exact URL. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticFeeds {
    responses: HashMap<String, Canned>,
    requested: Mutex<Vec<String>>,
}

impl StaticFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, canned: Canned) -> Self {
        self.responses.insert(url.to_string(), canned);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl FeedClient for StaticFeeds {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FeedError>> + Send {
        self.requested.lock().unwrap().push(url.to_string());
        let result = match self.responses.get(url) {
            Some(Canned::Body(body)) => Ok(body.clone().into_bytes()),
            Some(Canned::Status(status)) => Err(FeedError::Status(*status)),
            None => Err(FeedError::Status(StatusCode::NOT_FOUND)),
        };
        std::future::ready(result)
    }
}
