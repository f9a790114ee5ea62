/// Text-generation abstraction used by the ranking stage
use std::sync::Arc;

use crate::{
    config::{Config, LlmProvider},
    error::{AppError, AppResult},
};

pub mod huggingface;
pub mod openai;

pub use huggingface::HuggingFaceGenerator;
pub use openai::OpenAiChatGenerator;

/// Sampling parameters shared by every provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for remote text generators
///
/// Implementations send one prompt and return the model's free text. They
/// do not interpret the text; parsing belongs to the ranking stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Builds the generator selected by `LLM_PROVIDER`
pub fn build_text_generator(
    config: &Config,
    http_client: reqwest::Client,
) -> AppResult<Arc<dyn TextGenerator>> {
    let sampling = SamplingParams {
        temperature: config.llm_temperature,
        max_tokens: config.llm_max_tokens,
    };

    let generator: Arc<dyn TextGenerator> = match config.llm_provider {
        LlmProvider::Huggingface => {
            let token = config
                .hf_token()
                .ok_or_else(|| AppError::Configuration("HF_TOKEN is not set".to_string()))?;
            Arc::new(HuggingFaceGenerator::new(
                http_client,
                token.to_string(),
                config.hf_model_url.clone(),
                sampling,
            ))
        }
        LlmProvider::Openai => {
            let api_key = config.openai_api_key().ok_or_else(|| {
                AppError::Configuration("OPENAI_API_KEY is not set".to_string())
            })?;
            Arc::new(OpenAiChatGenerator::new(
                http_client,
                api_key.to_string(),
                config.openai_api_url.clone(),
                config.openai_model.clone(),
                sampling,
            ))
        }
    };

    tracing::info!(provider = generator.name(), "Text generator configured");
    Ok(generator)
}
