//! Chat-completions client for the HuggingFace inference router.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::types::MessageRole;

const HUGGINGFACE_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";

// Replies longer than one Discord message are chunked on send, so the
// completion cap is not tied to the 2000-character message limit.
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

/// One role-tagged message, both in conversation history and on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// A backend that turns a conversation into one generated reply.
///
/// The production implementation is [`HuggingFaceClient`]; tests substitute
/// scripted backends.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

pub struct HuggingFaceClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HuggingFaceClient {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for HuggingFaceClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Sending request to HuggingFace router with {} messages",
            messages.len()
        );

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(HUGGINGFACE_API_URL)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::InferenceApi { status, message });
        }

        let api_response: ChatCompletionResponse = response.json().await?;

        let reply = api_response
            .choices
            .first()
            .ok_or_else(|| BotError::InferenceResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if reply.is_empty() {
            return Err(BotError::InferenceResponse(
                "Empty message content in response".to_string(),
            ));
        }

        debug!("Received response from HuggingFace router");
        Ok(reply)
    }
}
