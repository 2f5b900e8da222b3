use async_trait::async_trait;

use crate::client::GeminiClient;
use crate::error::GeminiResult;
use crate::models::{GenerateContentRequest, GenerateContentResponse};

/// Backend-agnostic interface to a generative model.
///
/// Implemented by [`GeminiClient`]; tests substitute canned responses.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Free-text answer grounded on a web search.
    async fn generate_grounded(&self, prompt: &str) -> GeminiResult<GenerateContentResponse>;

    /// JSON answer constrained to `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> GeminiResult<GenerateContentResponse>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_grounded(&self, prompt: &str) -> GeminiResult<GenerateContentResponse> {
        let request = GenerateContentRequest::from_prompt(prompt).with_google_search();
        self.generate_content(&request).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> GeminiResult<GenerateContentResponse> {
        let request = GenerateContentRequest::from_prompt(prompt).with_response_schema(schema.clone());
        self.generate_content(&request).await
    }

    fn model_name(&self) -> &str {
        self.model()
    }
}
