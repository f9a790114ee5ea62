use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// Every pipeline stage returns one of these. The HTTP layer turns it into a
/// flat `{ "error": "..." }` body, so the `Display` text of each variant is
/// what the user reads.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Bad or missing user input; the user can correct it and resubmit
    #[error("{0}")]
    Validation(String),

    /// Missing credential or out-of-range setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Presign request or object PUT failed
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// Any other remote call that answered with a failure
    #[error("External API error: {0}")]
    Network(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Catalog or filter produced nothing to rank
    #[error("{0}")]
    NoMatch(String),

    /// The AI reply held no usable JSON array. The detail is only logged.
    #[error("Couldn't understand the AI's recommendations")]
    RecommendationParse(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Configuration(_) => "configuration",
            AppError::Upload(_) => "upload",
            AppError::Network(_) | AppError::HttpClient(_) => "network",
            AppError::NoMatch(_) => "no_match",
            AppError::RecommendationParse(_) => "recommendation_parse",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoMatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upload(_)
            | AppError::Network(_)
            | AppError::HttpClient(_)
            | AppError::RecommendationParse(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_flat() {
        let err = AppError::Validation("Please upload a clear photo of your face".to_string());
        assert_eq!(err.to_string(), "Please upload a clear photo of your face");
    }

    #[test]
    fn test_parse_error_hides_detail() {
        let err = AppError::RecommendationParse("expected `,` at line 3".to_string());
        assert_eq!(
            err.to_string(),
            "Couldn't understand the AI's recommendations"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NoMatch("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Upload("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Network("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::RecommendationParse("x".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Configuration("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
