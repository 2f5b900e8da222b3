use analysis_core::{
    AnalysisError, AnalysisResult, ErrorKind, SentimentStage, TechnicalStage, Timeframe,
};
use gemini_client::GenerativeModel;
use std::sync::Arc;

pub mod prompts;
pub mod sentiment;
pub mod session;
pub mod technical;

pub use sentiment::{extract_sources, SentimentFetcher, DEFAULT_MAX_SOURCES};
pub use session::{AnalysisSession, RequestOutcome, SessionSnapshot};
pub use technical::{classify_provider_error, parse_technical_analysis, TechnicalAnalysisRequester};

/// Where a single analysis run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Idle,
    FetchingSentiment,
    FetchingAnalysis,
    Done,
    Failed(ErrorKind),
}

/// Runs the two-stage analysis: live sentiment first, then a technical
/// analysis that takes the sentiment summary as context.
///
/// Nothing is cached or retried; every call issues fresh remote requests.
pub struct AnalysisOrchestrator {
    sentiment: Arc<dyn SentimentStage>,
    technical: Arc<dyn TechnicalStage>,
}

impl AnalysisOrchestrator {
    pub fn new(sentiment: Arc<dyn SentimentStage>, technical: Arc<dyn TechnicalStage>) -> Self {
        Self {
            sentiment,
            technical,
        }
    }

    /// Wire both stages to the same generative model.
    pub fn with_model(model: Arc<dyn GenerativeModel>, max_sources: usize) -> Self {
        Self::new(
            Arc::new(SentimentFetcher::new(model.clone()).with_max_sources(max_sources)),
            Arc::new(TechnicalAnalysisRequester::new(model)),
        )
    }

    pub async fn get_trade_analysis(
        &self,
        asset: &str,
        timeframe: Timeframe,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.run_observed(asset, timeframe, |_| {}).await
    }

    /// Same as [`get_trade_analysis`](Self::get_trade_analysis), reporting every
    /// stage transition to `on_stage`.
    pub async fn run_observed<F>(
        &self,
        asset: &str,
        timeframe: Timeframe,
        mut on_stage: F,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: FnMut(AnalysisStage) + Send,
    {
        let result = self.run_stages(asset, timeframe, &mut on_stage).await;
        match &result {
            Ok(analysis) => {
                tracing::info!(
                    "Analysis for {} ({}) done: {} @ {:.0}%",
                    asset,
                    timeframe,
                    analysis.recommendation(),
                    analysis.confidence()
                );
                on_stage(AnalysisStage::Done);
            }
            Err(e) => {
                tracing::warn!("Analysis for {} ({}) failed: {}", asset, timeframe, e);
                on_stage(AnalysisStage::Failed(e.kind()));
            }
        }
        result
    }

    async fn run_stages<F>(
        &self,
        asset: &str,
        timeframe: Timeframe,
        on_stage: &mut F,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: FnMut(AnalysisStage) + Send,
    {
        let asset = analysis_core::clean_asset(asset)
            .ok_or_else(|| AnalysisError::InvalidInput("asset must not be empty".to_string()))?;

        tracing::info!("Starting trade analysis for {} (timeframe: {})", asset, timeframe);

        on_stage(AnalysisStage::FetchingSentiment);
        let live_sentiment = self.sentiment.fetch_live_sentiment(&asset).await?;

        on_stage(AnalysisStage::FetchingAnalysis);
        let technical = self
            .technical
            .request_technical_analysis(&asset, timeframe, &live_sentiment.summary)
            .await?;

        Ok(AnalysisResult::new(technical, live_sentiment))
    }
}
