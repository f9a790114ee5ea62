use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

const GENERIC_BINARY: &str = "application/octet-stream";

/// Pre-signed write grant returned by the presign service
///
/// Created once per submission, consumed by the PUT, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
}

/// The user's photo as received from the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IngestedImage {
    /// Builds an image, sniffing the type from magic bytes when the client
    /// sent none or a generic binary type.
    pub fn new(file_name: impl Into<String>, declared_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let declared = declared_type
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(GENERIC_BINARY));

        let content_type = match declared {
            Some(t) => t.to_lowercase(),
            None => infer::get(&bytes)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| GENERIC_BINARY.to_string()),
        };

        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Local preview reference for the uploaded photo
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}
