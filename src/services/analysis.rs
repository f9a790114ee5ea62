use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, services::ensure_success};

const DEFAULT_TONE: &str = "medium";

/// Remote skin analysis keyed by an uploaded object
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SkinAnalyzer: Send + Sync {
    async fn estimate_tone(&self, key: &str) -> AppResult<String>;
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    estimated_tone: Option<String>,
}

impl AnalysisResponse {
    fn tone(self) -> String {
        self.estimated_tone
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TONE.to_string())
    }
}

pub struct RemoteSkinAnalyzer {
    http_client: HttpClient,
    analysis_url: String,
}

impl RemoteSkinAnalyzer {
    pub fn new(http_client: HttpClient, analysis_url: String) -> Self {
        Self {
            http_client,
            analysis_url,
        }
    }
}

#[async_trait::async_trait]
impl SkinAnalyzer for RemoteSkinAnalyzer {
    async fn estimate_tone(&self, key: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(&self.analysis_url)
            .json(&AnalysisRequest { key })
            .send()
            .await?;

        let response = ensure_success(response, "Skin analysis").await?;
        let tone = response.json::<AnalysisResponse>().await?.tone();

        tracing::info!(key = key, estimated_tone = %tone, "Skin analysis completed");
        Ok(tone)
    }
}
