//! Headline translation through the local language model.
//!
//! Titles without any Hangul syllable are sent to the model in numbered
//! batches. The model answers in free text, so the `"{n}. "` prefix of each
//! answer line is the only link back to the input title. Lines that cannot be
//! matched are dropped and the title they would have replaced stays as it
//! was. A failed batch leaves all of its titles untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::api::{AskAsync, Prompt};
use crate::models::Article;
use crate::utils::{contains_hangul, truncate_for_log};

/// Titles per model call.
pub const BATCH_SIZE: usize = 10;

const SYSTEM_PROMPT: &str = "영어를 한국어로 번역합니다. 번호와 번역만 출력합니다.";

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(.*)$").expect("numbered line pattern is valid"));

/// Outcome of one translation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslationReport {
    /// Titles that needed translation.
    pub candidates: usize,
    /// Titles actually rewritten.
    pub translated: usize,
    /// Batches whose model call failed.
    pub failed_batches: usize,
}

/// Map a model answer back onto a batch of `batch_len` titles.
///
/// Returns zero-based batch positions with their translated text. Lines
/// without a leading `"{n}."`, with `n` outside `1..=batch_len`, or with
/// nothing after the prefix are ignored. When an index repeats, the first
/// line wins.
pub fn parse_numbered_lines(answer: &str, batch_len: usize) -> BTreeMap<usize, String> {
    let mut translations = BTreeMap::new();
    for line in answer.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(caps) = NUMBERED_LINE.captures(line) else {
            continue;
        };
        let Ok(n) = caps[1].parse::<usize>() else {
            continue;
        };
        if n == 0 || n > batch_len {
            continue;
        }
        let text = caps[2].trim();
        if text.is_empty() {
            continue;
        }
        translations.entry(n - 1).or_insert_with(|| text.to_string());
    }
    translations
}

fn translation_prompt<'a>(titles: impl Iterator<Item = &'a str>) -> Prompt {
    let numbered = titles
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title.split_whitespace().join(" ")))
        .join("\n");

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "다음 영어 뉴스 제목들을 자연스러운 한국어로 번역해주세요.\n\
             번호와 번역만 출력하세요. 다른 설명은 하지 마세요.\n\n{numbered}"
        ),
        temperature: 0.1,
        max_tokens: 500,
    }
}

/// Rewrites foreign-language titles in place.
#[derive(Debug)]
pub struct TitleTranslator<M> {
    model: Arc<M>,
    batch_size: usize,
}

impl<M: AskAsync> TitleTranslator<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            batch_size: BATCH_SIZE,
        }
    }

    /// Translate every title that contains no Hangul.
    ///
    /// Only `title` is ever written; the number and order of articles, their
    /// links and sources are left alone. Makes no model call when nothing
    /// needs translating.
    #[instrument(level = "info", skip_all)]
    pub async fn translate(&self, articles: Vec<&mut Article>) -> TranslationReport {
        let mut pending: Vec<&mut Article> = articles
            .into_iter()
            .filter(|a| !contains_hangul(&a.title))
            .collect();

        let mut report = TranslationReport {
            candidates: pending.len(),
            ..Default::default()
        };
        if pending.is_empty() {
            debug!("No titles need translation");
            return report;
        }

        for (n, batch) in pending.chunks_mut(self.batch_size).enumerate() {
            let prompt = translation_prompt(batch.iter().map(|a| a.title.as_str()));
            match self.model.ask(&prompt).await {
                Ok(answer) => {
                    let translations = parse_numbered_lines(&answer, batch.len());
                    if translations.len() < batch.len() {
                        debug!(
                            batch = n,
                            matched = translations.len(),
                            size = batch.len(),
                            answer = %truncate_for_log(&answer, 300),
                            "Some titles were not matched in the answer"
                        );
                    }
                    for (i, title) in translations {
                        batch[i].title = title;
                        report.translated += 1;
                    }
                }
                Err(e) => {
                    report.failed_batches += 1;
                    warn!(
                        batch = n,
                        size = batch.len(),
                        error = %e,
                        "Batch translation failed; keeping original titles"
                    );
                }
            }
        }

        info!(
            translated = report.translated,
            candidates = report.candidates,
            failed_batches = report.failed_batches,
            "Translated foreign titles"
        );
        report
    }
}
