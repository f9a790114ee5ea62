use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{IngestedImage, SubmissionReport},
    services::SubmissionRequest,
};

fn form_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid form data: {}", e))
}

async fn text_field(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(form_error)
}

/// Reads the multipart form into a raw submission
///
/// Unknown parts are ignored. Categories may come as repeated
/// `product_type` parts or one comma-separated `product_types` part.
async fn read_submission(multipart: &mut Multipart) -> AppResult<SubmissionRequest> {
    let mut request = SubmissionRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                request.image = Some(IngestedImage::new(
                    file_name,
                    content_type.as_deref(),
                    bytes.to_vec(),
                ));
            }
            "skin_type" => request.skin_type = Some(text_field(field).await?),
            "finish" => request.finish = Some(text_field(field).await?),
            "budget" => request.budget = Some(text_field(field).await?),
            "product_type" => request.product_types.push(text_field(field).await?),
            "product_types" => {
                let joined = text_field(field).await?;
                request
                    .product_types
                    .extend(joined.split(',').map(|v| v.trim().to_string()));
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(request)
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<SubmissionReport>> {
    let request = read_submission(&mut multipart).await?;
    let report = state.pipeline.submit(request).await?;
    Ok(Json(report))
}
