use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{SamplingParams, TextGenerator};
use crate::{
    error::{AppError, AppResult},
    services::ensure_success,
};

const SYSTEM_PROMPT: &str = "You are a professional makeup artist. \
You answer with a JSON array only, never with prose or Markdown.";

/// Chat-completions compatible endpoint (OpenAI or a drop-in gateway)
pub struct OpenAiChatGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    sampling: SamplingParams,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_choice_text(response: ChatResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AppError::Network("Chat completion returned no content".to_string()))
}

impl OpenAiChatGenerator {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        model: String,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            model,
            sampling,
        }
    }

    fn request_body(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiChatGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let response = ensure_success(response, "Chat completion").await?;
        let completion: ChatResponse = response.json().await?;
        let text = first_choice_text(completion)?;

        tracing::info!(
            provider = self.name(),
            model = %self.model,
            response_chars = text.len(),
            "Generation completed"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
