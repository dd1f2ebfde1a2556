
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::conversation::{Message, Role};
use crate::client::ApiClient;
use crate::config::OpenAiConfig;
use crate::{RagError, Result};

const COMPLETIONS_PATH: &str = "chat/completions";

/// Generative model that answers a transcript with one assistant message
pub trait CompletionProvider: Send + Sync {
    fn complete(&self, messages: &[Message]) -> Result<Message>;
}

/// Completion gateway for the OpenAI `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: ApiClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: &str) -> Result<Self> {
        let client = ApiClient::new(config, api_key)?;

        Ok(Self {
            client,
            model: config.completion_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionProvider for OpenAiChatClient {
    fn complete(&self, messages: &[Message]) -> Result<Message> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Requesting completion from {} with {} messages",
            self.model,
            messages.len()
        );

        let response = self.client.post_json(COMPLETIONS_PATH, &request)?;
        let parsed: ChatResponse = serde_json::from_str(&response.body).map_err(|e| {
            response.malformed(format!("Failed to parse completion response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RagError::EmptyResponse("No choices returned".to_string()))?
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RagError::EmptyResponse("First choice has no content".to_string()))?;

        debug!("Completion returned {} characters", content.chars().count());
        Ok(Message::new(Role::Assistant, content))
    }
}
