use reqwest::{header::CONTENT_TYPE, Client as HttpClient, Response};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{IngestedImage, UploadTicket},
    services::truncate_for_log,
};

/// Pre-signed object storage
///
/// `presign` asks the backend for a one-shot write grant and `put_object`
/// writes the bytes straight to storage with it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn presign(&self, file_name: &str, file_type: &str) -> AppResult<UploadTicket>;

    async fn put_object(
        &self,
        ticket: &UploadTicket,
        content_type: &str,
        bytes: &[u8],
    ) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct PresignRequest<'a> {
    file_name: &'a str,
    file_type: &'a str,
}

/// Storage backed by a presign HTTP endpoint
pub struct PresignedUploader {
    http_client: HttpClient,
    presign_url: String,
}

impl PresignedUploader {
    pub fn new(http_client: HttpClient, presign_url: String) -> Self {
        Self {
            http_client,
            presign_url,
        }
    }
}

async fn upload_status(response: Response, step: &str) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        step = step,
        status = %status,
        body = %truncate_for_log(&body, 500),
        "Upload request failed"
    );
    Err(AppError::Upload(format!("{} returned status {}", step, status)))
}

#[async_trait::async_trait]
impl ObjectStorage for PresignedUploader {
    async fn presign(&self, file_name: &str, file_type: &str) -> AppResult<UploadTicket> {
        let response = self
            .http_client
            .post(&self.presign_url)
            .json(&PresignRequest {
                file_name,
                file_type,
            })
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("presign request failed: {}", e)))?;

        let response = upload_status(response, "presign").await?;
        response
            .json::<UploadTicket>()
            .await
            .map_err(|e| AppError::Upload(format!("invalid presign response: {}", e)))
    }

    async fn put_object(
        &self,
        ticket: &UploadTicket,
        content_type: &str,
        bytes: &[u8],
    ) -> AppResult<()> {
        let response = self
            .http_client
            .put(&ticket.upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("upload request failed: {}", e)))?;

        upload_status(response, "upload").await?;
        Ok(())
    }
}

/// Presigns and uploads the image, returning the stored object key
pub async fn upload_image(storage: &dyn ObjectStorage, image: &IngestedImage) -> AppResult<String> {
    let ticket = storage
        .presign(&image.file_name, &image.content_type)
        .await?;
    storage
        .put_object(&ticket, &image.content_type, &image.bytes)
        .await?;

    tracing::info!(key = %ticket.key, size = image.size(), "Image uploaded");
    Ok(ticket.key)
}
