//! Messages API client

use crate::prompts::FIELD_ANALYSIS_PROMPT;
use crate::schema::{parse_candidates, FieldCandidate};
use crate::{Result, VisionError};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use tracing::debug;

/// Model used when neither the environment nor the caller overrides it
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2000;

/// Field analysis as an opaque collaborator.
///
/// The trait is the only thing the placement pipeline sees, so tests can
/// substitute a stub that returns canned candidates without any network.
pub trait FieldAnalyzer {
    /// Identify form fields on a rendered page.
    ///
    /// # Arguments
    /// * `page_png` - PNG-encoded page image
    /// * `data_summary` - "key: value, ..." summary of the answers on hand
    fn describe_fields(
        &self,
        page_png: &[u8],
        data_summary: &str,
    ) -> impl Future<Output = Result<Vec<FieldCandidate>>> + Send;
}

/// Client for the hosted vision-language model
pub struct ModelClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ModelClient {
    /// Create a client with the default model
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build a client from the environment.
    ///
    /// `ANTHROPIC_API_KEY` is required; `ANTHROPIC_MODEL` optionally
    /// overrides the default model id.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| VisionError::MissingApiKey)?;
        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key).with_model(model))
    }

    /// Model id this client will query
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Text content block of a Messages API response; non-text blocks
/// deserialize with an empty `text` and drop out of the concatenation.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl FieldAnalyzer for ModelClient {
    async fn describe_fields(
        &self,
        page_png: &[u8],
        data_summary: &str,
    ) -> Result<Vec<FieldCandidate>> {
        let prompt = FIELD_ANALYSIS_PROMPT.replace("{data}", data_summary);
        let encoded = BASE64_STANDARD.encode(page_png);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": encoded,
                        },
                    },
                ],
            }],
        });

        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessagesResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Request(e.to_string()))?;
        let text: String = message
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect();
        debug!("model field analysis: {text}");

        parse_candidates(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAnalyzer {
        canned: Vec<FieldCandidate>,
    }

    impl FieldAnalyzer for StubAnalyzer {
        async fn describe_fields(
            &self,
            _page_png: &[u8],
            _data_summary: &str,
        ) -> Result<Vec<FieldCandidate>> {
            Ok(self.canned.clone())
        }
    }

    #[tokio::test]
    async fn test_stub_analyzer_satisfies_trait() {
        let stub = StubAnalyzer {
            canned: parse_candidates(r#"[{"field_name": "Name", "x": 1, "y": 2}]"#).unwrap(),
        };
        let candidates = stub.describe_fields(b"png", "Name: Jane").await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].field_name, "Name");
    }

    #[test]
    fn test_with_model_overrides_default() {
        let client = ModelClient::new("key").with_model("claude-test");
        assert_eq!(client.model(), "claude-test");
    }
}
