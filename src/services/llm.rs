use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;
use crate::database::models::{PromptMessage, PromptRole};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Invalid LLM client configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// Text generation backend used by the chat pipeline
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        messages: &[PromptMessage],
        system_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Client for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| LlmError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| LlmError::Config(format!("invalid API version header value: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
        })
    }

    /// `system` prompt entries join the fixed instruction and `user` entries become
    /// messages. A prompt with no `user` entry is sent as one user turn instead, since
    /// the API needs at least one message.
    fn build_request<'a>(
        &'a self,
        messages: &'a [PromptMessage],
        system_prompt: &str,
        max_tokens: u32,
    ) -> MessageRequest<'a> {
        let (instructions, turns): (Vec<&PromptMessage>, Vec<&PromptMessage>) = messages
            .iter()
            .partition(|m| m.role == PromptRole::System);

        let mut system_parts: Vec<&str> = Vec::new();
        if !system_prompt.trim().is_empty() {
            system_parts.push(system_prompt);
        }

        let api_messages = if turns.is_empty() {
            let content = instructions
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            vec![ApiMessage {
                role: "user",
                content: Cow::Owned(content),
            }]
        } else {
            system_parts.extend(instructions.iter().map(|m| m.content.as_str()));
            turns
                .into_iter()
                .map(|m| ApiMessage {
                    role: "user",
                    content: Cow::Borrowed(m.content.as_str()),
                })
                .collect()
        };

        MessageRequest {
            model: &self.model,
            max_tokens,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            messages: api_messages,
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(
        &self,
        messages: &[PromptMessage],
        system_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let request = self.build_request(messages, system_prompt, max_tokens);

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        debug!(status = %status, model = %self.model, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessageResponse = response.json().await?;
        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }
}
