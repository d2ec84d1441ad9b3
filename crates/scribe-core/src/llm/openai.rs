//! OpenAI-compatible chat-completions client (OpenAI, OpenRouter, local gateways).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatModel, CompletionRequest, LlmMessage, ModelTurn, ToolCall};
use crate::error::LlmError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [serde_json::Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Live model backend. Cheap to share; the inner reqwest client pools connections.
pub struct OpenAiClient {
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Client with default URL, model, temperature and timeout. Blank keys are rejected.
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim().to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.trim().to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Decode a chat-completions body into a turn (first choice only).
pub(crate) fn parse_completion(body: &str) -> Result<ModelTurn, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(LlmError::EmptyResponse)?;
    Ok(ModelTurn {
        content: message.content.filter(|c| !c.trim().is_empty()),
        tool_calls: message.tool_calls.unwrap_or_default(),
    })
}

#[async_trait::async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelTurn, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.as_slice())
            },
            temperature: Some(self.temperature),
        };

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "[SCRIBE] Sending completion request"
        );

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_completion(&text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
