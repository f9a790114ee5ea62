use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PriceValue;

/// One ranked pick returned by the text generator
///
/// `name`, `brand`, `type` and `why` are required; a reply missing any of
/// them fails to decode and counts as unparsable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub price: Option<PriceValue>,
    pub why: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Response body for a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub recommendations: Vec<Recommendation>,
    /// `data:` URL of the submitted photo for local display
    pub preview: Option<String>,
    /// Number of filtered products offered to the ranking stage
    pub candidate_count: usize,
    pub estimated_tone: Option<String>,
    pub generated_at: DateTime<Utc>,
}
