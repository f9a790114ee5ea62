/// Sephora catalog provider (via RapidAPI)
///
/// The mirror returns storefront-shaped products: `displayName`,
/// `brandName`, `currentSku.listPrice` and a relative `targetUrl`.
use crate::{
    error::{AppError, AppResult},
    models::{PriceValue, ProductRecord, ProductType},
    services::{ensure_success, providers::{absolute_link, ProductSource}},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

pub const DEFAULT_LIMIT: usize = 5;
const STOREFRONT_ORIGIN: &str = "https://www.sephora.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SephoraSearchResponse {
    #[serde(default)]
    pub products: Vec<SephoraProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SephoraProduct {
    pub display_name: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub current_sku: Option<SephoraSku>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SephoraSku {
    #[serde(default)]
    pub list_price: Option<PriceValue>,
}

#[derive(Clone)]
pub struct SephoraSource {
    http_client: HttpClient,
    api_key: String,
    api_host: String,
    api_url: String,
    origin: url::Url,
    limit: usize,
}

impl SephoraSource {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_host: String,
        api_url: String,
        limit: usize,
    ) -> AppResult<Self> {
        let origin = url::Url::parse(STOREFRONT_ORIGIN)
            .map_err(|e| AppError::Internal(format!("Invalid storefront origin: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_host,
            api_url: api_url.trim_end_matches('/').to_string(),
            origin,
            limit,
        })
    }

    fn list_url(&self) -> String {
        format!("{}/products/list", self.api_url)
    }

    fn normalize(&self, response: SephoraSearchResponse, product_type: ProductType) -> Vec<ProductRecord> {
        response
            .products
            .into_iter()
            .take(self.limit)
            .filter_map(|p| {
                let name = p.display_name.filter(|n| !n.trim().is_empty())?;
                Some(ProductRecord {
                    name,
                    brand: p.brand_name.unwrap_or_else(|| "Unknown Brand".to_string()),
                    price: p
                        .current_sku
                        .and_then(|sku| sku.list_price)
                        .unwrap_or_else(PriceValue::unavailable),
                    product_type,
                    link: absolute_link(&self.origin, p.target_url.as_deref()),
                    image: p.hero_image.unwrap_or_default(),
                    description: None,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductSource for SephoraSource {
    async fn fetch_products(&self, product_type: ProductType) -> AppResult<Vec<ProductRecord>> {
        let page_size = self.limit.to_string();
        let response = self
            .http_client
            .get(self.list_url())
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .query(&[("q", product_type.as_str()), ("pageSize", page_size.as_str())])
            .send()
            .await?;

        let response = ensure_success(response, "Sephora API").await?;
        let search: SephoraSearchResponse = response.json().await?;
        let records = self.normalize(search, product_type);

        tracing::info!(
            product_type = %product_type,
            results = records.len(),
            provider = self.name(),
            "Catalog fetch completed"
        );

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "sephora"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_source() -> SephoraSource {
        SephoraSource::new(
            reqwest::Client::new(),
            "test_key".to_string(),
            "sephora.p.rapidapi.com".to_string(),
            "http://test.local".to_string(),
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_sephora_response_normalization() {
        let json = r#"{
            "products": [{
                "displayName": "Pro Filt'r Soft Matte Foundation",
                "brandName": "Fenty Beauty",
                "currentSku": {"listPrice": "$40.00", "skuId": "2163168"},
                "targetUrl": "/product/pro-filt-r-soft-matte-longwear-foundation-P87985432",
                "heroImage": "https://www.sephora.com/productimages/sku/s2163168-main-grid.jpg"
            }]
        }"#;

        let response: SephoraSearchResponse = serde_json::from_str(json).unwrap();
        let records = create_test_source().normalize(response, ProductType::Foundation);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Pro Filt'r Soft Matte Foundation");
        assert_eq!(record.brand, "Fenty Beauty");
        assert_eq!(record.price.numeric(), Some(40.0));
        assert_eq!(
            record.link,
            "https://www.sephora.com/product/pro-filt-r-soft-matte-longwear-foundation-P87985432"
        );
    }

    #[test]
    fn test_missing_sku_price_is_unavailable() {
        let json = r#"{"products": [{"displayName": "Cheek Tint"}]}"#;

        let response: SephoraSearchResponse = serde_json::from_str(json).unwrap();
        let records = create_test_source().normalize(response, ProductType::Blush);

        assert_eq!(records[0].price, PriceValue::unavailable());
        assert_eq!(records[0].link, "#");
    }

    #[test]
    fn test_limit_counts_products_before_dropping_nameless() {
        let json = r#"{"products": [
            {"displayName": ""},
            {"displayName": "Blush A"},
            {"displayName": "Blush B"}
        ]}"#;
        let source = SephoraSource::new(
            reqwest::Client::new(),
            "test_key".to_string(),
            "sephora.p.rapidapi.com".to_string(),
            "http://test.local".to_string(),
            2,
        )
        .unwrap();

        let response: SephoraSearchResponse = serde_json::from_str(json).unwrap();
        let records = source.normalize(response, ProductType::Blush);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Blush A"]);
    }

    #[test]
    fn test_list_url() {
        assert_eq!(create_test_source().list_url(), "http://test.local/products/list");
    }

    #[test]
    fn test_empty_response_body() {
        let response: SephoraSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(create_test_source()
            .normalize(response, ProductType::Lipstick)
            .is_empty());
    }
}
