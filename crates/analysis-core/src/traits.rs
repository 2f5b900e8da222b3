use async_trait::async_trait;
use crate::{AnalysisError, LiveSentiment, TechnicalAnalysis, Timeframe};

/// First pipeline stage: live market sentiment for an asset
#[async_trait]
pub trait SentimentStage: Send + Sync {
    async fn fetch_live_sentiment(&self, asset: &str) -> Result<LiveSentiment, AnalysisError>;
}

/// Second pipeline stage: technical analysis using the sentiment as context
#[async_trait]
pub trait TechnicalStage: Send + Sync {
    async fn request_technical_analysis(
        &self,
        asset: &str,
        timeframe: Timeframe,
        sentiment_summary: &str,
    ) -> Result<TechnicalAnalysis, AnalysisError>;
}
