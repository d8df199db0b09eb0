use serde::{Deserialize, Serialize};

use crate::model::config::SummaryConfig;

use super::{IntegrationError, check_status, http_client};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: String,
    /// Null when the model refused
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, trimmed; empty or missing content is an error
    pub fn first_content(&self) -> Result<&str, IntegrationError> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(IntegrationError::EmptyResponse)
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct ChatClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl ChatClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, IntegrationError> {
        Ok(ChatClient {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            client: http_client()?,
        })
    }

    /// Endpoint and model from config, API key from the configured
    /// environment variable
    pub fn from_config(config: &SummaryConfig) -> Result<Self, IntegrationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| IntegrationError::MissingApiKey(config.api_key_env.clone()))?;
        ChatClient::new(&config.endpoint, &config.model, api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
        }
    }

    pub fn send(&self, request: &ChatRequest) -> Result<ChatResponse, IntegrationError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;
        let response: ChatResponse = check_status(response)?.json()?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                total = usage.total_tokens,
                "chat usage"
            );
        }
        Ok(response)
    }

    /// One round trip; returns the reply text
    pub fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, IntegrationError> {
        let response = self.send(&self.request(messages))?;
        response.first_content().map(str::to_string)
    }
}
