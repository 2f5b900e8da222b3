use analysis_core::{AnalysisError, LiveSentiment, SentimentStage, Source};
use async_trait::async_trait;
use gemini_client::{GenerateContentResponse, GenerativeModel};
use std::sync::Arc;

use crate::prompts::sentiment_prompt;

/// Default cap on retained citations
pub const DEFAULT_MAX_SOURCES: usize = 10;

/// Fetches a web-grounded sentiment summary for an asset.
pub struct SentimentFetcher {
    model: Arc<dyn GenerativeModel>,
    max_sources: usize,
}

impl SentimentFetcher {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            max_sources: DEFAULT_MAX_SOURCES,
        }
    }

    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }
}

/// Citations with both a uri and a title, in provider order, at most `limit`.
pub fn extract_sources(response: &GenerateContentResponse, limit: usize) -> Vec<Source> {
    response
        .grounding_chunks()
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let title = web.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
            Some(Source {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl SentimentStage for SentimentFetcher {
    async fn fetch_live_sentiment(&self, asset: &str) -> Result<LiveSentiment, AnalysisError> {
        tracing::info!("Fetching live sentiment for {} (model: {})", asset, self.model.model_name());

        let response = self
            .model
            .generate_grounded(&sentiment_prompt(asset))
            .await
            .map_err(|e| {
                tracing::error!("Gemini sentiment API error for {}: {}", asset, e);
                AnalysisError::SentimentFetch
            })?;

        let summary = response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("Gemini sentiment response for {} contained no text", asset);
                AnalysisError::SentimentFetch
            })?;

        let sources = extract_sources(&response, self.max_sources);
        tracing::info!("Live sentiment for {}: {} chars, {} sources", asset, summary.len(), sources.len());

        Ok(LiveSentiment { summary, sources })
    }
}
