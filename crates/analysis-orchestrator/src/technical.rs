use analysis_core::{AnalysisError, TechnicalAnalysis, TechnicalStage, Timeframe};
use async_trait::async_trait;
use gemini_client::{GeminiError, GenerativeModel, ProviderErrorKind};
use std::sync::Arc;

use crate::prompts::{technical_analysis_prompt, technical_analysis_schema};

/// Requests a structured technical analysis, using the sentiment summary as context.
pub struct TechnicalAnalysisRequester {
    model: Arc<dyn GenerativeModel>,
    schema: serde_json::Value,
}

impl TechnicalAnalysisRequester {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            schema: technical_analysis_schema(),
        }
    }
}

/// Map a transport failure onto the user-facing taxonomy.
pub fn classify_provider_error(err: &GeminiError) -> AnalysisError {
    match err.kind() {
        ProviderErrorKind::Authentication => AnalysisError::Authentication,
        ProviderErrorKind::RateLimit => AnalysisError::RateLimit,
        ProviderErrorKind::Other => AnalysisError::AnalysisRequest,
    }
}

/// Decode the model's JSON payload.
///
/// The schema sent with the request makes `keyFactors` mandatory; blank factor
/// strings and non-finite confidence are rejected here as well, and confidence
/// is clamped into 0..=100.
pub fn parse_technical_analysis(payload: &str) -> Result<TechnicalAnalysis, AnalysisError> {
    let mut analysis: TechnicalAnalysis =
        serde_json::from_str(payload.trim()).map_err(|e| AnalysisError::AnalysisParse {
            detail: e.to_string(),
        })?;

    if !analysis.confidence.is_finite() {
        return Err(AnalysisError::AnalysisParse {
            detail: format!("confidence is not a finite number: {}", analysis.confidence),
        });
    }
    if analysis.key_factors.sentiment.trim().is_empty() || analysis.key_factors.technical.trim().is_empty() {
        return Err(AnalysisError::AnalysisParse {
            detail: "keyFactors.sentiment and keyFactors.technical must not be empty".to_string(),
        });
    }

    analysis.confidence = analysis.confidence.clamp(0.0, 100.0);
    Ok(analysis)
}

#[async_trait]
impl TechnicalStage for TechnicalAnalysisRequester {
    async fn request_technical_analysis(
        &self,
        asset: &str,
        timeframe: Timeframe,
        sentiment_summary: &str,
    ) -> Result<TechnicalAnalysis, AnalysisError> {
        tracing::info!("Requesting technical analysis for {} ({})", asset, timeframe);

        let prompt = technical_analysis_prompt(asset, timeframe, sentiment_summary);
        let response = self
            .model
            .generate_structured(&prompt, &self.schema)
            .await
            .map_err(|e| {
                tracing::error!("Gemini technical analysis API error for {}: {}", asset, e);
                classify_provider_error(&e)
            })?;

        let payload = response.text().ok_or_else(|| {
            tracing::error!("Gemini technical analysis for {} contained no text", asset);
            AnalysisError::AnalysisParse {
                detail: "empty response".to_string(),
            }
        })?;

        parse_technical_analysis(&payload).map_err(|e| {
            if let AnalysisError::AnalysisParse { detail } = &e {
                tracing::error!("Unparseable technical analysis for {}: {}", asset, detail);
            }
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Recommendation;
    use gemini_client::{GeminiResult, GenerateContentResponse};
    use std::sync::Mutex;

    struct CannedModel {
        reply: Box<dyn Fn() -> GeminiResult<GenerateContentResponse> + Send + Sync>,
        seen: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl CannedModel {
        fn new(reply: impl Fn() -> GeminiResult<GenerateContentResponse> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                reply: Box::new(reply),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn text(text: &'static str) -> Arc<Self> {
            Self::new(move || Ok(GenerateContentResponse::from_text(text)))
        }
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate_grounded(&self, _prompt: &str) -> GeminiResult<GenerateContentResponse> {
            unreachable!("technical analysis uses structured generation only")
        }

        async fn generate_structured(
            &self,
            prompt: &str,
            schema: &serde_json::Value,
        ) -> GeminiResult<GenerateContentResponse> {
            self.seen.lock().unwrap().push((prompt.to_string(), schema.clone()));
            (self.reply)()
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    const VALID: &str = r#"{
        "recommendation": "LONG",
        "confidence": 72,
        "summary": "Tendencia alcista con soporte en 60k.",
        "keyFactors": {"sentiment": "Optimismo institucional", "technical": "Cruce dorado en diario"}
    }"#;

    #[tokio::test]
    async fn test_parses_structured_payload() {
        let model = CannedModel::text(VALID);
        let requester = TechnicalAnalysisRequester::new(model.clone());

        let analysis = requester
            .request_technical_analysis("BTC-USD", Timeframe::Day1, "alcista")
            .await
            .unwrap();
        assert_eq!(analysis.recommendation, Recommendation::Long);
        assert_eq!(analysis.confidence, 72.0);
        assert_eq!(analysis.key_factors.technical, "Cruce dorado en diario");

        let seen = model.seen.lock().unwrap();
        assert!(seen[0].0.contains("\"alcista\""));
        assert_eq!(seen[0].1["type"], "OBJECT");
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let requester = TechnicalAnalysisRequester::new(CannedModel::text("{\"recommendation\": \"LONG\", "));
        let err = requester
            .request_technical_analysis("BTC-USD", Timeframe::Day1, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisParse { .. }));
    }

    #[tokio::test]
    async fn test_non_conforming_json_is_parse_error() {
        let payloads = [
            r#"{"recommendation": "BUY", "confidence": 50, "summary": "s", "keyFactors": {"sentiment": "a", "technical": "b"}}"#,
            r#"{"recommendation": "LONG", "confidence": 50, "summary": "s"}"#,
            r#"{"recommendation": "LONG", "confidence": 50, "summary": "s", "keyFactors": {"sentiment": "a"}}"#,
            r#"{"recommendation": "LONG", "confidence": "high", "summary": "s", "keyFactors": {"sentiment": "a", "technical": "b"}}"#,
            r#"{"recommendation": "LONG", "confidence": 50, "summary": "s", "keyFactors": {"sentiment": " ", "technical": "b"}}"#,
            r#"[]"#,
        ];
        for payload in payloads {
            let err = parse_technical_analysis(payload).unwrap_err();
            assert_eq!(err.kind(), analysis_core::ErrorKind::AnalysisParse, "{}", payload);
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        let payload = VALID.replace("72", "140");
        assert_eq!(parse_technical_analysis(&payload).unwrap().confidence, 100.0);
        let payload = VALID.replace("72", "-3");
        assert_eq!(parse_technical_analysis(&payload).unwrap().confidence, 0.0);
    }

    #[tokio::test]
    async fn test_empty_response_is_parse_error() {
        let requester = TechnicalAnalysisRequester::new(CannedModel::new(|| Ok(GenerateContentResponse::default())));
        let err = requester
            .request_technical_analysis("AAPL", Timeframe::Week1, "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), analysis_core::ErrorKind::AnalysisParse);
    }

    #[tokio::test]
    async fn test_provider_errors_are_classified() {
        let cases: Vec<(Box<dyn Fn() -> GeminiError + Send + Sync>, AnalysisError)> = vec![
            (
                Box::new(|| GeminiError::from_response(400, r#"{"error":{"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#)),
                AnalysisError::Authentication,
            ),
            (
                Box::new(|| GeminiError::from_response(429, r#"{"error":{"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#)),
                AnalysisError::RateLimit,
            ),
            (
                Box::new(|| GeminiError::from_response(500, "internal error")),
                AnalysisError::AnalysisRequest,
            ),
            (Box::new(|| GeminiError::Timeout), AnalysisError::AnalysisRequest),
        ];

        for (make, expected) in cases {
            let requester = TechnicalAnalysisRequester::new(CannedModel::new(move || Err(make())));
            let err = requester
                .request_technical_analysis("AAPL", Timeframe::Hour1, "x")
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }
}
