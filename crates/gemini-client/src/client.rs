use reqwest::Client;

use crate::error::{GeminiError, GeminiResult};
use crate::models::{GenerateContentRequest, GenerateContentResponse};
use crate::GeminiConfig;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// POST a `generateContent` request and decode the response.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        tracing::debug!(
            "Gemini generateContent (model: {}, tools: {}, structured: {})",
            self.config.model,
            request.tools.len(),
            request.generation_config.is_some()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let err = GeminiError::from_response(status.as_u16(), &body);
            tracing::warn!("Gemini API returned HTTP {}: {}", status, err);
            return Err(err);
        }

        serde_json::from_str::<GenerateContentResponse>(&body)
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))
    }
}

/// The client timeout covers the body read too, so both stages map the same way.
fn transport_error(e: reqwest::Error) -> GeminiError {
    if e.is_timeout() {
        GeminiError::Timeout
    } else {
        GeminiError::RequestFailed(e)
    }
}
