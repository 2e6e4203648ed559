//! Perplexity chat-completions client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider};
use crate::error::LlmError;

pub const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";

const PROVIDER: &str = "perplexity";

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Perplexity (OpenAI-compatible) completion provider.
pub struct PerplexityProvider {
    api_key: SecretString,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl PerplexityProvider {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, model, PERPLEXITY_API_URL)
    }

    /// Point at a different OpenAI-compatible endpoint.
    pub fn with_endpoint(
        api_key: SecretString,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for PerplexityProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err_text = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Perplexity request rejected");
            return Err(LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: format!("{} {}", status, err_text),
            });
        }

        let raw = resp.text().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.into(),
            reason: e.to_string(),
        })?;

        Ok(CompletionResponse {
            content: parse_content(&raw)?,
        })
    }
}

/// `choices[0].message.content`, trimmed; empty if absent.
fn parse_content(raw: &str) -> Result<String, LlmError> {
    let reply: ChatCompletionReply = serde_json::from_str(raw)?;
    Ok(reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default())
}
