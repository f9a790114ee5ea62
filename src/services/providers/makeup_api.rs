/// Makeup API provider (makeup-api.herokuapp.com)
///
/// Free JSON catalog queried by `product_type`. No credentials needed.
use crate::{
    error::AppResult,
    models::{PriceValue, ProductRecord, ProductType},
    services::{ensure_success, providers::ProductSource},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://makeup-api.herokuapp.com";
pub const DEFAULT_LIMIT: usize = 5;

/// Product as returned by `/api/v1/products.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MakeupApiProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<PriceValue>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub api_featured_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MakeupApiProduct {
    /// Normalizes into a catalog record; nameless products are dropped
    fn into_record(self, product_type: ProductType) -> Option<ProductRecord> {
        let name = non_blank(self.name)?;

        let price = match self.price {
            Some(PriceValue::Text(text)) if text.trim().is_empty() => PriceValue::unavailable(),
            Some(price) => price,
            None => PriceValue::unavailable(),
        };

        Some(ProductRecord {
            name,
            brand: non_blank(self.brand).unwrap_or_else(|| "Unknown Brand".to_string()),
            price,
            product_type,
            link: non_blank(self.website_link)
                .or_else(|| non_blank(self.product_link))
                .unwrap_or_else(|| "#".to_string()),
            image: non_blank(self.api_featured_image).unwrap_or_default(),
            description: non_blank(self.description),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct MakeupApiSource {
    http_client: HttpClient,
    api_url: String,
    limit: usize,
}

impl MakeupApiSource {
    pub fn new(http_client: HttpClient, api_url: String, limit: usize) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            limit,
        }
    }

    /// Keeps the first `limit` raw products, then drops the nameless ones
    fn normalize(&self, products: Vec<MakeupApiProduct>, product_type: ProductType) -> Vec<ProductRecord> {
        products
            .into_iter()
            .take(self.limit)
            .filter_map(|p| p.into_record(product_type))
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductSource for MakeupApiSource {
    async fn fetch_products(&self, product_type: ProductType) -> AppResult<Vec<ProductRecord>> {
        let url = format!("{}/api/v1/products.json", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("product_type", product_type.as_str())])
            .send()
            .await?;

        let response = ensure_success(response, "Makeup API").await?;
        let products: Vec<MakeupApiProduct> = response.json().await?;
        let records = self.normalize(products, product_type);

        tracing::info!(
            product_type = %product_type,
            results = records.len(),
            provider = self.name(),
            "Catalog fetch completed"
        );

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "makeup_api"
    }
}
