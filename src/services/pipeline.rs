use std::sync::Arc;
use tracing::Instrument;

use crate::{
    config::{Config, PipelineSettings},
    error::{AppError, AppResult},
    models::{
        Finish, IngestedImage, ProductType, Recommendation, SkinType, Stage, Submission,
        SubmissionReport, UserProfile,
    },
    services::{
        analysis::{RemoteSkinAnalyzer, SkinAnalyzer},
        build_http_client,
        catalog::retrieve_catalog,
        filter::{filter_catalog, FilterCriteria},
        ingestion::validate_image,
        llm::{build_text_generator, TextGenerator},
        providers::{build_product_source, ProductSource},
        ranking::{build_prompt, parse_recommendations, with_format_reminder},
        storage::{upload_image, ObjectStorage, PresignedUploader},
        throttle::RequestThrottle,
        truncate_for_log,
    },
};

/// Raw form input for one submission, before validation
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub image: Option<IngestedImage>,
    pub skin_type: Option<String>,
    pub finish: Option<String>,
    pub budget: Option<String>,
    pub product_types: Vec<String>,
}

/// Selected categories in submission order, duplicates dropped
fn parse_product_types(raw: &[String]) -> AppResult<Vec<ProductType>> {
    let mut selected = Vec::new();
    for value in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        let product_type = ProductType::parse(value).ok_or_else(|| {
            AppError::Validation(format!("Unknown product type: {}", value))
        })?;
        if !selected.contains(&product_type) {
            selected.push(product_type);
        }
    }

    if selected.is_empty() {
        return Err(AppError::Validation(
            "Please select at least one product type".to_string(),
        ));
    }
    Ok(selected)
}

fn parse_budget(raw: Option<&str>) -> AppResult<f64> {
    raw.map(str::trim)
        .and_then(|v| v.trim_start_matches('$').parse::<f64>().ok())
        .filter(|b| b.is_finite() && *b > 0.0)
        .ok_or_else(|| AppError::Validation("Please enter a valid budget".to_string()))
}

fn parse_profile(request: &SubmissionRequest) -> AppResult<UserProfile> {
    let selected_types = parse_product_types(&request.product_types)?;

    let skin_type = request
        .skin_type
        .as_deref()
        .and_then(SkinType::parse)
        .ok_or_else(|| AppError::Validation("Please select your skin type".to_string()))?;

    let finish = request
        .finish
        .as_deref()
        .and_then(Finish::parse)
        .ok_or_else(|| AppError::Validation("Please select a preferred finish".to_string()))?;

    let budget = parse_budget(request.budget.as_deref())?;

    Ok(UserProfile {
        skin_type,
        finish,
        budget,
        selected_types,
    })
}

/// Runs submissions through ingestion, retrieval, filtering and ranking
///
/// One `Pipeline` is shared by every request; only the throttle carries
/// state between submissions.
pub struct Pipeline {
    settings: Arc<PipelineSettings>,
    source: Arc<dyn ProductSource>,
    generator: Arc<dyn TextGenerator>,
    storage: Option<Arc<dyn ObjectStorage>>,
    analyzer: Option<Arc<dyn SkinAnalyzer>>,
    throttle: RequestThrottle,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        source: Arc<dyn ProductSource>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let throttle = RequestThrottle::new(settings.category_interval);
        Self {
            settings: Arc::new(settings),
            source,
            generator,
            storage: None,
            analyzer: None,
            throttle,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn SkinAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Wires the configured providers onto one shared HTTP client
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = build_http_client(config.http_timeout())?;
        let source = build_product_source(config, http_client.clone())?;
        let generator = build_text_generator(config, http_client.clone())?;

        let mut pipeline = Self::new(config.pipeline_settings(), source, generator);

        if let Some(url) = config.presign_url() {
            pipeline = pipeline.with_storage(Arc::new(PresignedUploader::new(
                http_client.clone(),
                url.to_string(),
            )));
        }
        if let Some(url) = config.analysis_url() {
            pipeline = pipeline
                .with_analyzer(Arc::new(RemoteSkinAnalyzer::new(http_client, url.to_string())));
        }

        tracing::info!(
            catalog = pipeline.source.name(),
            generator = pipeline.generator.name(),
            upload = pipeline.storage.is_some(),
            analysis = pipeline.analyzer.is_some(),
            "Pipeline configured"
        );
        Ok(pipeline)
    }

    /// Runs one submission to a terminal stage
    ///
    /// Errors from any stage are caught here and recorded on the
    /// submission; the recommendation list stays empty unless every stage
    /// succeeded.
    pub async fn run(&self, request: SubmissionRequest) -> Submission {
        let mut submission = Submission::new();
        let span = tracing::info_span!("submission", submission_id = %submission.id);

        let outcome = self
            .drive(&mut submission, request)
            .instrument(span.clone())
            .await;
        let outcome = match outcome {
            Ok(recommendations) => submission.succeed(recommendations),
            Err(e) => Err(e),
        };

        let _guard = span.enter();
        match outcome {
            Ok(()) => tracing::info!(
                recommendations = submission.recommendations().len(),
                "Submission succeeded"
            ),
            Err(e) => {
                tracing::warn!(
                    stage = %submission.stage(),
                    kind = e.kind(),
                    error = %e,
                    "Submission failed"
                );
                submission.fail(e);
            }
        }

        submission
    }

    pub async fn submit(&self, request: SubmissionRequest) -> AppResult<SubmissionReport> {
        self.run(request).await.into_result()
    }

    async fn drive(
        &self,
        submission: &mut Submission,
        request: SubmissionRequest,
    ) -> AppResult<Vec<Recommendation>> {
        submission.advance(Stage::Validating)?;
        let image = validate_image(request.image.clone(), self.settings.max_image_bytes)?;
        let profile = parse_profile(&request)?;
        submission.set_preview(image.preview_data_url());

        let mut object_key = None;
        if let Some(storage) = &self.storage {
            submission.advance(Stage::Uploading)?;
            object_key = Some(upload_image(storage.as_ref(), &image).await?);
        }

        if let (Some(analyzer), Some(key)) = (&self.analyzer, object_key.as_deref()) {
            submission.advance(Stage::Analyzing)?;
            let tone = analyzer.estimate_tone(key).await?;
            submission.set_estimated_tone(tone);
        }

        submission.advance(Stage::Retrieving {
            categories: profile.selected_types.len(),
        })?;
        let catalog = retrieve_catalog(
            self.source.as_ref(),
            &profile.selected_types,
            &self.throttle,
            self.settings.catalog_concurrency,
        )
        .await;
        if catalog.is_empty() {
            return Err(AppError::NoMatch(
                "No products found for selected categories".to_string(),
            ));
        }

        submission.advance(Stage::Filtering)?;
        let criteria = FilterCriteria {
            budget: profile.budget,
            finish: self.settings.require_finish_match.then_some(profile.finish),
            exclude_unpriced: self.settings.exclude_unpriced,
        };
        let candidates = filter_catalog(catalog, &criteria)?;
        submission.set_candidate_count(candidates.len());

        submission.advance(Stage::Prompting)?;
        let prompt = build_prompt(
            &candidates,
            &profile,
            submission.estimated_tone(),
            self.settings.max_prompt_candidates,
        );
        tracing::debug!(
            candidates = candidates.len(),
            prompt_chars = prompt.len(),
            "Prompt built"
        );

        self.rank(submission, &prompt).await
    }

    /// Alternates AwaitingAi and ParsingResult until the reply parses
    ///
    /// Only unparsable replies are retried, up to `ranking_max_attempts`
    /// calls in total. Generator failures end the submission at once.
    async fn rank(
        &self,
        submission: &mut Submission,
        prompt: &str,
    ) -> AppResult<Vec<Recommendation>> {
        let max_attempts = self.settings.ranking_max_attempts.max(1);
        let mut current_prompt = prompt.to_string();

        for attempt in 1..=max_attempts {
            submission.advance(Stage::AwaitingAi)?;
            let response = self.generator.generate(&current_prompt).await?;

            submission.advance(Stage::ParsingResult)?;
            match parse_recommendations(&response) {
                Ok(recommendations) => {
                    tracing::info!(
                        attempt = attempt,
                        recommendations = recommendations.len(),
                        provider = self.generator.name(),
                        "Recommendations parsed"
                    );
                    return Ok(recommendations);
                }
                Err(AppError::RecommendationParse(detail)) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        detail = %detail,
                        "Unparsable recommendations, retrying with stricter instruction"
                    );
                    current_prompt = with_format_reminder(prompt);
                }
                Err(e) => {
                    if let AppError::RecommendationParse(detail) = &e {
                        tracing::error!(
                            attempt = attempt,
                            detail = %detail,
                            response = %truncate_for_log(&response, 1000),
                            "Failed to parse AI response"
                        );
                    }
                    return Err(e);
                }
            }
        }

        Err(AppError::Internal("ranking loop exited without a result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_product_types_keep_order_and_dedupe() {
        let parsed =
            parse_product_types(&strings(&["lipstick", " Blush ", "lipstick", "", "foundation"]))
                .unwrap();
        assert_eq!(
            parsed,
            vec![ProductType::Lipstick, ProductType::Blush, ProductType::Foundation]
        );
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = parse_product_types(&strings(&["", "  "])).unwrap_err();
        assert_eq!(err.to_string(), "Please select at least one product type");
    }

    #[test]
    fn test_unknown_product_type_is_rejected() {
        let err = parse_product_types(&strings(&["mascara"])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_budget_parsing() {
        assert_eq!(parse_budget(Some("25")).unwrap(), 25.0);
        assert_eq!(parse_budget(Some(" $19.5 ")).unwrap(), 19.5);

        for bad in [None, Some(""), Some("abc"), Some("0"), Some("-5"), Some("inf"), Some("NaN")] {
            let err = parse_budget(bad).unwrap_err();
            assert_eq!(err.to_string(), "Please enter a valid budget");
        }
    }

    #[test]
    fn test_profile_requires_skin_type_and_finish() {
        let request = SubmissionRequest {
            skin_type: Some("oily".to_string()),
            finish: None,
            budget: Some("30".to_string()),
            product_types: strings(&["blush"]),
            ..Default::default()
        };
        let err = parse_profile(&request).unwrap_err();
        assert_eq!(err.to_string(), "Please select a preferred finish");

        let request = SubmissionRequest {
            finish: Some("dewy".to_string()),
            ..request
        };
        let profile = parse_profile(&request).unwrap();
        assert_eq!(profile.skin_type, SkinType::Oily);
        assert_eq!(profile.finish, Finish::Dewy);
        assert_eq!(profile.selected_types, vec![ProductType::Blush]);
    }
}
