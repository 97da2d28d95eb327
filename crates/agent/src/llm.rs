use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bookstore_core::config::{LlmConfig, LlmProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Client for any endpoint speaking `/v1/chat/completions` (OpenAI, Ollama).
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleClient {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    api_key: Option<SecretString>,
}

impl OpenAiCompatibleClient {
    /// Returns `None` for the offline provider.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        if config.provider == LlmProvider::Offline {
            return Ok(None);
        }
        let url = config
            .completions_url()
            .ok_or_else(|| anyhow!("no completions endpoint for {:?}", config.provider))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build LLM HTTP client")?;

        Ok(Some(Self {
            client,
            url,
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        }))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: prompt },
            ],
            temperature: self.temperature,
        };

        debug!(
            event_name = "agent.llm.request",
            model = %self.model,
            prompt_len = prompt.len(),
            "sending completion request"
        );

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.context("completion request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("completion endpoint returned {status}: {body}"));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .context("failed to parse completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("completion response carried no content"))
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
