pub mod analysis;
pub mod catalog;
pub mod filter;
pub mod ingestion;
pub mod llm;
pub mod pipeline;
pub mod providers;
pub mod ranking;
pub mod storage;
pub mod throttle;

pub use pipeline::{Pipeline, SubmissionRequest};
pub use throttle::RequestThrottle;

use reqwest::{Client as HttpClient, Response};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Shared outbound client with a request timeout
pub fn build_http_client(timeout: Duration) -> AppResult<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Turns a non-success response into `AppError::Network`
pub(crate) async fn ensure_success(response: Response, service: &str) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        service = service,
        status = %status,
        body = %truncate_for_log(&body, 500),
        "External API request failed"
    );
    Err(AppError::Network(format!(
        "{} returned status {}",
        service, status
    )))
}

pub(crate) fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc... (truncated)");
    }
}
