//! OpenAI-compatible adapter for transcript analysis.
//!
//! Supports OpenAI API, Azure OpenAI, local Ollama, and other gateways that speak the
//! chat completions protocol. Implements `CompletionPort`.

use crate::domain::DomainError;
use crate::ports::CompletionPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAI-compatible completion adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    web_search: bool,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4", "llama3.2")
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            temperature: None,
            web_search: false,
        })
    }

    /// Sampling temperature. Omitted from the request when unset.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask gateways that support it to augment the completion with web search.
    pub fn with_web_search(mut self, web_search: bool) -> Self {
        self.web_search = web_search;
        self
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            web_search: self.web_search,
        }
    }

    /// Pull the first non-empty completion out of a parsed response.
    fn extract_content(response: ChatResponse) -> Result<String, DomainError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Ai("No response choices returned".to_string()))?
            .message
            .content
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(DomainError::Ai("Empty completion returned".to_string()));
        }
        Ok(content)
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    // Strict OpenAI endpoints reject unknown fields; only send when asked for.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    web_search: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[async_trait::async_trait]
impl CompletionPort for OpenAiAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending transcript to AI for analysis"
        );

        let request = self.build_request(prompt);

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Ai(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Ai(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Ai(format!("Failed to parse API response: {}", e)))?;

        let content = Self::extract_content(chat_response)?;
        debug!(content_len = content.len(), "received AI response");

        Ok(content)
    }
}
