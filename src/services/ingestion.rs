use crate::{
    error::{AppError, AppResult},
    models::IngestedImage,
};

const MISSING_IMAGE: &str = "Please upload a clear photo of your face";
const NOT_AN_IMAGE: &str = "Please upload an image file";

fn size_limit_message(max_bytes: usize) -> String {
    let mb = max_bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("Image must be {} MB or smaller", mb as u64)
    } else {
        format!("Image must be {:.1} MB or smaller", mb)
    }
}

/// Checks the uploaded photo before anything remote is contacted
pub fn validate_image(image: Option<IngestedImage>, max_bytes: usize) -> AppResult<IngestedImage> {
    let image = image
        .filter(|i| i.size() > 0)
        .ok_or_else(|| AppError::Validation(MISSING_IMAGE.to_string()))?;

    if !image.is_image() {
        tracing::debug!(content_type = %image.content_type, "Rejected non-image upload");
        return Err(AppError::Validation(NOT_AN_IMAGE.to_string()));
    }

    if image.size() > max_bytes {
        tracing::debug!(size = image.size(), max_bytes = max_bytes, "Rejected oversize upload");
        return Err(AppError::Validation(size_limit_message(max_bytes)));
    }

    Ok(image)
}
