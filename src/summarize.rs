//! Narrative digest of the whole article set.
//!
//! [`Summarizer::summarize`] always returns text. When there is nothing to
//! summarize or the model cannot be used, the text is a fixed message meant
//! for the dashboard reader instead of a summary.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::api::{AskAsync, Prompt};
use crate::error::AskError;
use crate::models::Article;

/// Shown when no feed produced any article.
pub const NO_ARTICLES_MESSAGE: &str = "수집된 뉴스가 없습니다.";

/// Shown when nothing is listening at the model endpoint.
pub const MODEL_NOT_RUNNING_MESSAGE: &str =
    "LM Studio가 실행되지 않았습니다. LM Studio를 실행하고 Start Server를 눌러주세요.";

const SYSTEM_PROMPT: &str = "당신은 AI 뉴스 전문 분석가입니다. 핵심만 간결하게 요약합니다.";

fn summary_prompt(articles: &[&Article]) -> Prompt {
    let listing = articles
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {} ({})", i + 1, a.title, a.source))
        .join("\n");

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "다음은 한국/해외 다양한 매체에서 수집한 AI 뉴스 헤드라인입니다.\n\
             모두 한국어로 분석하고 상세하게 요약해주세요.\n\n\
             뉴스 목록:\n{listing}\n\n\
             요구사항:\n\
             - 10~15줄로 국내외 핵심 트렌드를 상세히 요약\n\
             - 주요 뉴스별로 구체적인 내용과 의미를 설명\n\
             - 카테고리별(국내 동향, 해외 동향, 기술 트렌드, 산업 전망)로 나누어 정리\n\
             - 중요한 키워드(회사명, 기술명, 서비스명 등)는 그대로 유지\n\
             - 읽기 쉽게 문단을 나누어 작성"
        ),
        temperature: 0.3,
        max_tokens: 1500,
    }
}

#[derive(Debug)]
pub struct Summarizer<M> {
    model: Arc<M>,
}

impl<M: AskAsync> Summarizer<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    /// Summarize `articles` in one model call.
    #[instrument(level = "info", skip_all)]
    pub async fn summarize(&self, articles: &[&Article]) -> String {
        if articles.is_empty() {
            info!("No articles to summarize");
            return NO_ARTICLES_MESSAGE.to_string();
        }

        match self.model.ask(&summary_prompt(articles)).await {
            Ok(summary) => {
                info!(articles = articles.len(), chars = summary.chars().count(), "Summary complete");
                summary
            }
            Err(AskError::Unreachable(e)) => {
                warn!(error = %e, "Language model is not running");
                MODEL_NOT_RUNNING_MESSAGE.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Summary failed");
                format!("요약 실패: {}", e)
            }
        }
    }
}
