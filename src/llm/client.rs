use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_openai::types as openai_types;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Sampling is deterministic for verification and classification.
pub const TEMPERATURE: f32 = 0.0;

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Sends the message through the typed client and returns the first
    /// choice's content, empty when the provider sent none.
    async fn complete_text(&self, message: ChatMessage) -> Result<String>;

    /// Sends the message as a plain HTTP call and returns the JSON body as-is.
    async fn complete_raw(&self, message: ChatMessage) -> Result<Value>;
}

pub struct OpenAiVisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiVisionClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url, CHAT_COMPLETIONS_PATH),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts one chat completion request. Each call is a single attempt and
    /// a non-2xx reply becomes [`Error::Upstream`] with the provider's body.
    async fn post_chat<T: Serialize>(&self, request: &T) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn complete_text(&self, message: ChatMessage) -> Result<String> {
        debug!("Creating typed chat completion, model: {}", self.model);

        let openai_request = openai_types::CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.to_openai_message()?])
            .temperature(TEMPERATURE)
            .build()?;

        let reply = self.post_chat(&openai_request).await?;
        let status = reply.status().as_u16();
        let body = reply.text().await?;

        let response: openai_types::CreateChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| {
                debug!("Chat completion body did not parse: {}", e);
                Error::Upstream { status, body }
            })?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    async fn complete_raw(&self, message: ChatMessage) -> Result<Value> {
        debug!("Posting chat completion to {}", self.endpoint);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![message],
            temperature: TEMPERATURE,
        };

        let body: Value = self.post_chat(&request).await?.json().await?;
        debug!("Received raw chat completion body");
        Ok(body)
    }
}
