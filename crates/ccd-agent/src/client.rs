//! Gemini API client
//!
//! One `generateContent` call per invocation. The client never retries:
//! every failure is reported to the caller, which owns the retry budget.

use crate::generator::TextGenerator;
use crate::types::{GeminiRequest, GeminiResponse};
use async_trait::async_trait;
use ccd_core::{CcdError, GenerationConfig, RequestPayload, Result, DEFAULT_API_BASE, DEFAULT_MODEL};

/// Client for the Gemini generative language API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    /// Create a new client using the default model and endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a client from run configuration
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_model(config.model.clone())
            .with_api_base(config.api_base.clone())
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full `generateContent` endpoint for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, payload: &RequestPayload) -> Result<String> {
        tracing::debug!(
            "Sending request to Gemini model {} ({} chars)",
            self.model,
            payload.text().len()
        );

        let request = GeminiRequest::user_prompt(payload.text());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CcdError::Api(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(CcdError::Api(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CcdError::Api(format!("Failed to parse response: {}", e)))?;

        let output = extract_output(&gemini_response)?;

        if let Some(ref usage) = gemini_response.usage_metadata {
            tracing::info!(
                "Gemini response received ({} chars, {} input tokens, {} output tokens)",
                output.len(),
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        } else {
            tracing::info!("Gemini response received ({} chars)", output.len());
        }

        Ok(output)
    }
}

fn extract_output(response: &GeminiResponse) -> Result<String> {
    match response.first_text() {
        Some(text) => Ok(text.to_string()),
        None => {
            let reason = response
                .candidates
                .first()
                .and_then(|candidate| candidate.finish_reason.as_deref())
                .unwrap_or("no candidates");
            Err(CcdError::Api(format!(
                "No content in response (finish reason: {})",
                reason
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("key")
            .with_model("gemini-1.5-flash")
            .with_api_base("http://localhost:9000/");

        assert_eq!(client.model(), "gemini-1.5-flash");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_default_endpoint() {
        let client = GeminiClient::new("key");
        assert_eq!(
            client.endpoint(),
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                DEFAULT_MODEL
            )
        );
    }

    #[test]
    fn test_from_config() {
        let config = GenerationConfig::from_lookup(|key| match key {
            "DATA_PATH" => Some("data".to_string()),
            "OUT_PATH" => Some("out".to_string()),
            "GOOGLE_API_KEY" => Some("secret".to_string()),
            "MAX_ATTEMPTS" => Some("2".to_string()),
            "GOOGLE_MODEL" => Some("gemini-1.5-pro".to_string()),
            _ => None,
        })
        .unwrap();

        let client = GeminiClient::from_config(&config);
        assert_eq!(client.model(), "gemini-1.5-pro");
        assert!(client.endpoint().starts_with(DEFAULT_API_BASE));
    }

    #[test]
    fn test_extract_output_reports_finish_reason() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        let err = extract_output(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        let err = extract_output(&response).unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_api_error() {
        let client = GeminiClient::new("key").with_api_base("http://127.0.0.1:1");
        let err = client
            .generate(&RequestPayload::new("prompt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CcdError::Api(_)));
    }
}
