use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::{SamplingParams, TextGenerator};
use crate::{error::AppResult, services::ensure_success};

/// Hugging Face inference API running an instruction-tuned model
pub struct HuggingFaceGenerator {
    http_client: HttpClient,
    token: String,
    model_url: String,
    sampling: SamplingParams,
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    return_full_text: bool,
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: String,
}

/// Wraps the prompt in the instruction markers the model was tuned on
fn instruction_prompt(prompt: &str) -> String {
    format!("[INST] {} [/INST]", prompt.trim())
}

/// First generation's text, or empty when the model returned nothing
fn first_generated_text(generations: Vec<Generation>) -> String {
    generations
        .into_iter()
        .next()
        .map(|g| g.generated_text)
        .unwrap_or_default()
}

impl HuggingFaceGenerator {
    pub fn new(
        http_client: HttpClient,
        token: String,
        model_url: String,
        sampling: SamplingParams,
    ) -> Self {
        Self {
            http_client,
            token,
            model_url,
            sampling,
        }
    }

    fn request_body(&self, prompt: &str) -> InferenceRequest {
        InferenceRequest {
            inputs: instruction_prompt(prompt),
            parameters: InferenceParameters {
                return_full_text: false,
                max_new_tokens: self.sampling.max_tokens,
                temperature: self.sampling.temperature,
            },
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for HuggingFaceGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.model_url)
            .bearer_auth(&self.token)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let response = ensure_success(response, "Hugging Face inference").await?;
        let generations: Vec<Generation> = response.json().await?;
        let text = first_generated_text(generations);

        tracing::info!(
            provider = self.name(),
            response_chars = text.len(),
            "Generation completed"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}
