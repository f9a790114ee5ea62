use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Which catalog backs retrieval
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogProvider {
    #[default]
    MakeupApi,
    Sephora,
    StorefrontScraper,
}

/// Which text-generation service ranks the candidates
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Huggingface,
    Openai,
}

/// Application configuration loaded from environment variables
///
/// Read once at startup and validated with [`Config::validate`]; the
/// pipeline never looks at the environment again.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub catalog_provider: CatalogProvider,

    /// Base URL of the catalog API (makeup API or the RapidAPI mirror)
    #[serde(default)]
    pub catalog_url: Option<String>,

    pub rapidapi_key: Option<String>,

    #[serde(default = "default_rapidapi_host")]
    pub rapidapi_host: String,

    pub scraper_api_key: Option<String>,

    #[serde(default = "default_scraper_api_url")]
    pub scraper_api_url: String,

    /// Storefront origin used for scraped pages and relative product links
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,

    #[serde(default)]
    pub llm_provider: LlmProvider,

    pub hf_token: Option<String>,

    #[serde(default = "default_hf_model_url")]
    pub hf_model_url: String,

    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,

    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,

    /// Presign endpoint; when unset the upload stage is skipped
    pub presign_url: Option<String>,

    /// Skin analysis endpoint; only used together with `presign_url`
    pub analysis_url: Option<String>,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Per-category cap; each provider has its own default when unset
    pub products_per_category: Option<usize>,

    #[serde(default = "default_category_request_interval_ms")]
    pub category_request_interval_ms: u64,

    #[serde(default = "default_catalog_concurrency")]
    pub catalog_concurrency: usize,

    #[serde(default = "default_max_prompt_candidates")]
    pub max_prompt_candidates: usize,

    #[serde(default = "default_ranking_max_attempts")]
    pub ranking_max_attempts: usize,

    #[serde(default)]
    pub require_finish_match: bool,

    #[serde(default)]
    pub exclude_unpriced: bool,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rapidapi_host() -> String {
    "sephora.p.rapidapi.com".to_string()
}

fn default_scraper_api_url() -> String {
    "https://api.scraperapi.com/".to_string()
}

fn default_storefront_url() -> String {
    "https://www.ulta.com".to_string()
}

fn default_hf_model_url() -> String {
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    600
}

fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_category_request_interval_ms() -> u64 {
    500
}

fn default_catalog_concurrency() -> usize {
    1
}

fn default_max_prompt_candidates() -> usize {
    15
}

fn default_ranking_max_attempts() -> usize {
    1
}

fn default_http_timeout_secs() -> u64 {
    30
}

/// Treats blank values the same as unset ones
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Pipeline knobs derived from [`Config`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_image_bytes: usize,
    pub category_interval: Duration,
    pub catalog_concurrency: usize,
    pub max_prompt_candidates: usize,
    pub ranking_max_attempts: usize,
    pub require_finish_match: bool,
    pub exclude_unpriced: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            category_interval: Duration::from_millis(default_category_request_interval_ms()),
            catalog_concurrency: default_catalog_concurrency(),
            max_prompt_candidates: default_max_prompt_candidates(),
            ranking_max_attempts: default_ranking_max_attempts(),
            require_finish_match: false,
            exclude_unpriced: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Checks credentials and ranges before any network call is made
    pub fn validate(&self) -> AppResult<()> {
        match self.llm_provider {
            LlmProvider::Huggingface if present(&self.hf_token).is_none() => {
                return Err(AppError::Configuration(
                    "HF_TOKEN is required for the huggingface provider".to_string(),
                ));
            }
            LlmProvider::Openai if present(&self.openai_api_key).is_none() => {
                return Err(AppError::Configuration(
                    "OPENAI_API_KEY is required for the openai provider".to_string(),
                ));
            }
            _ => {}
        }

        match self.catalog_provider {
            CatalogProvider::Sephora if present(&self.rapidapi_key).is_none() => {
                return Err(AppError::Configuration(
                    "RAPIDAPI_KEY is required for the sephora catalog".to_string(),
                ));
            }
            CatalogProvider::StorefrontScraper if present(&self.scraper_api_key).is_none() => {
                return Err(AppError::Configuration(
                    "SCRAPER_API_KEY is required for the storefront scraper".to_string(),
                ));
            }
            _ => {}
        }

        if present(&self.analysis_url).is_some() && present(&self.presign_url).is_none() {
            return Err(AppError::Configuration(
                "ANALYSIS_URL needs PRESIGN_URL: analysis reads the uploaded object key"
                    .to_string(),
            ));
        }

        if self.max_image_bytes == 0 {
            return Err(AppError::Configuration(
                "MAX_IMAGE_BYTES must be positive".to_string(),
            ));
        }
        if self.catalog_concurrency == 0 {
            return Err(AppError::Configuration(
                "CATALOG_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if self.ranking_max_attempts == 0 {
            return Err(AppError::Configuration(
                "RANKING_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.max_prompt_candidates == 0 {
            return Err(AppError::Configuration(
                "MAX_PROMPT_CANDIDATES must be at least 1".to_string(),
            ));
        }
        if self.products_per_category == Some(0) {
            return Err(AppError::Configuration(
                "PRODUCTS_PER_CATEGORY must be at least 1".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(AppError::Configuration(
                "HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        if self.llm_max_tokens == 0 {
            return Err(AppError::Configuration(
                "LLM_MAX_TOKENS must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(AppError::Configuration(
                "LLM_TEMPERATURE must be between 0 and 2".to_string(),
            ));
        }

        Ok(())
    }

    pub fn hf_token(&self) -> Option<&str> {
        present(&self.hf_token)
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        present(&self.openai_api_key)
    }

    pub fn rapidapi_key(&self) -> Option<&str> {
        present(&self.rapidapi_key)
    }

    pub fn scraper_api_key(&self) -> Option<&str> {
        present(&self.scraper_api_key)
    }

    pub fn presign_url(&self) -> Option<&str> {
        present(&self.presign_url)
    }

    pub fn analysis_url(&self) -> Option<&str> {
        present(&self.analysis_url)
    }

    pub fn catalog_url(&self) -> Option<&str> {
        present(&self.catalog_url)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Request body limit: room for the largest accepted image plus form fields
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes.saturating_mul(2).max(1024 * 1024)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            max_image_bytes: self.max_image_bytes,
            category_interval: Duration::from_millis(self.category_request_interval_ms),
            catalog_concurrency: self.catalog_concurrency,
            max_prompt_candidates: self.max_prompt_candidates,
            ranking_max_attempts: self.ranking_max_attempts,
            require_finish_match: self.require_finish_match,
            exclude_unpriced: self.exclude_unpriced,
        }
    }
}
