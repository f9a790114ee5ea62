use chrono::Utc;
use serde::Serialize;
use std::fmt::Display;
use uuid::Uuid;

use super::{Recommendation, SubmissionReport};
use crate::error::{AppError, AppResult};

/// Where a submission currently is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    Uploading,
    Analyzing,
    Retrieving { categories: usize },
    Filtering,
    Prompting,
    AwaitingAi,
    ParsingResult,
    Success,
    Failed,
}

impl Stage {
    fn order(&self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::Validating => 1,
            Stage::Uploading => 2,
            Stage::Analyzing => 3,
            Stage::Retrieving { .. } => 4,
            Stage::Filtering => 5,
            Stage::Prompting => 6,
            Stage::AwaitingAi => 7,
            Stage::ParsingResult => 8,
            Stage::Success => 9,
            Stage::Failed => 10,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Success | Stage::Failed)
    }

    /// Whether `next` is a legal successor of `self`
    ///
    /// Stages only move forward. Uploading and Analyzing may be skipped when
    /// not configured. A retry moves ParsingResult back to AwaitingAi.
    /// Failed is reachable from any live stage; Success only from
    /// ParsingResult.
    pub fn can_advance_to(&self, next: Stage) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (*self, next) {
            (_, Stage::Failed) => true,
            (Stage::ParsingResult, Stage::Success) => true,
            (_, Stage::Success) => false,
            (Stage::ParsingResult, Stage::AwaitingAi) => true,
            (Stage::Idle, Stage::Validating) => true,
            (Stage::Idle, _) => false,
            (Stage::Validating, Stage::Uploading | Stage::Analyzing) => true,
            (from, to) => {
                let skips_optional = from.order() < 4 && to.order() == 4;
                to.order() == from.order() + 1 || skips_optional
            }
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::Validating => f.write_str("validating"),
            Stage::Uploading => f.write_str("uploading"),
            Stage::Analyzing => f.write_str("analyzing"),
            Stage::Retrieving { categories } => write!(f, "retrieving[{}]", categories),
            Stage::Filtering => f.write_str("filtering"),
            Stage::Prompting => f.write_str("prompting"),
            Stage::AwaitingAi => f.write_str("awaiting_ai"),
            Stage::ParsingResult => f.write_str("parsing_result"),
            Stage::Success => f.write_str("success"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}

/// One form submission's in-memory state
///
/// Recommendations are assigned only on success, so a failed submission
/// never exposes a partial list.
#[derive(Debug)]
pub struct Submission {
    pub id: Uuid,
    stage: Stage,
    failed_at: Option<Stage>,
    preview: Option<String>,
    estimated_tone: Option<String>,
    candidate_count: usize,
    recommendations: Vec<Recommendation>,
    failure: Option<AppError>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: Stage::Idle,
            failed_at: None,
            preview: None,
            estimated_tone: None,
            candidate_count: 0,
            recommendations: Vec::new(),
            failure: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The live stage a failed submission was in when it failed
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn estimated_tone(&self) -> Option<&str> {
        self.estimated_tone.as_deref()
    }

    pub fn failure(&self) -> Option<&AppError> {
        self.failure.as_ref()
    }

    pub fn advance(&mut self, next: Stage) -> AppResult<()> {
        if !self.stage.can_advance_to(next) {
            return Err(AppError::Internal(format!(
                "illegal stage transition {} -> {}",
                self.stage, next
            )));
        }
        tracing::debug!(
            submission_id = %self.id,
            from = %self.stage,
            to = %next,
            "Stage transition"
        );
        self.stage = next;
        Ok(())
    }

    pub fn set_preview(&mut self, preview: String) {
        self.preview = Some(preview);
    }

    pub fn set_estimated_tone(&mut self, tone: String) {
        self.estimated_tone = Some(tone);
    }

    pub fn set_candidate_count(&mut self, count: usize) {
        self.candidate_count = count;
    }

    pub fn succeed(&mut self, recommendations: Vec<Recommendation>) -> AppResult<()> {
        self.advance(Stage::Success)?;
        self.recommendations = recommendations;
        Ok(())
    }

    pub fn fail(&mut self, error: AppError) {
        if !self.stage.is_terminal() {
            self.failed_at = Some(self.stage);
            self.stage = Stage::Failed;
        }
        self.recommendations.clear();
        self.failure = Some(error);
    }

    pub fn into_result(self) -> AppResult<SubmissionReport> {
        if let Some(error) = self.failure {
            return Err(error);
        }
        if self.stage != Stage::Success {
            return Err(AppError::Internal(format!(
                "submission ended in stage {}",
                self.stage
            )));
        }
        Ok(SubmissionReport {
            recommendations: self.recommendations,
            preview: self.preview,
            candidate_count: self.candidate_count,
            estimated_tone: self.estimated_tone,
            generated_at: Utc::now(),
        })
    }
}
