/// Product catalog abstraction
///
/// Each provider talks to one remote catalog (a JSON product API, a RapidAPI
/// storefront mirror, or a scraped storefront page) and normalizes whatever
/// shape it returns into [`ProductRecord`].
use std::sync::Arc;

use crate::{
    config::{CatalogProvider, Config},
    error::{AppError, AppResult},
    models::{ProductRecord, ProductType},
};

pub mod makeup_api;
pub mod sephora;
pub mod storefront_scraper;

pub use makeup_api::MakeupApiSource;
pub use sephora::SephoraSource;
pub use storefront_scraper::StorefrontScraperSource;

/// Trait for product catalog providers
///
/// One call issues exactly one outbound request for one category and
/// returns at most the provider's per-category limit.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch normalized products for a single category
    async fn fetch_products(&self, product_type: ProductType) -> AppResult<Vec<ProductRecord>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Builds the catalog source selected by `CATALOG_PROVIDER`
pub fn build_product_source(
    config: &Config,
    http_client: reqwest::Client,
) -> AppResult<Arc<dyn ProductSource>> {
    let source: Arc<dyn ProductSource> = match config.catalog_provider {
        CatalogProvider::MakeupApi => Arc::new(MakeupApiSource::new(
            http_client,
            config
                .catalog_url()
                .unwrap_or(makeup_api::DEFAULT_API_URL)
                .to_string(),
            config
                .products_per_category
                .unwrap_or(makeup_api::DEFAULT_LIMIT),
        )),
        CatalogProvider::Sephora => {
            let api_key = config.rapidapi_key().ok_or_else(|| {
                AppError::Configuration("RAPIDAPI_KEY is not set".to_string())
            })?;
            Arc::new(SephoraSource::new(
                http_client,
                api_key.to_string(),
                config.rapidapi_host.clone(),
                config
                    .catalog_url()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("https://{}", config.rapidapi_host)),
                config.products_per_category.unwrap_or(sephora::DEFAULT_LIMIT),
            )?)
        }
        CatalogProvider::StorefrontScraper => {
            let api_key = config.scraper_api_key().ok_or_else(|| {
                AppError::Configuration("SCRAPER_API_KEY is not set".to_string())
            })?;
            Arc::new(StorefrontScraperSource::new(
                http_client,
                api_key.to_string(),
                config.scraper_api_url.clone(),
                &config.storefront_url,
                config
                    .products_per_category
                    .unwrap_or(storefront_scraper::DEFAULT_LIMIT),
            )?)
        }
    };

    tracing::info!(provider = source.name(), "Product source configured");
    Ok(source)
}

/// Resolves a possibly relative product link against a storefront origin
pub(crate) fn absolute_link(origin: &url::Url, href: Option<&str>) -> String {
    match href.map(str::trim).filter(|h| !h.is_empty()) {
        Some(href) => origin
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| "#".to_string()),
        None => "#".to_string(),
    }
}
