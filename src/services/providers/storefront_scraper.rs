/// Storefront scraper provider
///
/// Fetches a rendered category page through a scraping proxy and reads the
/// product cards out of the HTML. Selectors follow the storefront markup and
/// will need updating when it changes.
use crate::{
    error::{AppError, AppResult},
    models::{PriceValue, ProductRecord, ProductType},
    services::{
        ensure_success,
        providers::{absolute_link, ProductSource},
    },
};
use reqwest::Client as HttpClient;
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_LIMIT: usize = 8;

const CARD_SELECTOR: &str = ".ProductCard";
const TITLE_SELECTOR: &str = ".ProductCard__title";
const BRAND_SELECTOR: &str = ".ProductCard__brand";
const PRICE_SELECTOR: &str = ".ProductCard__price";

/// Compiled selectors for one product card layout
struct CardSelectors {
    card: Selector,
    title: Selector,
    brand: Selector,
    price: Selector,
    link: Selector,
    image: Selector,
}

impl CardSelectors {
    fn compile() -> AppResult<Self> {
        let parse = |css: &str| {
            Selector::parse(css)
                .map_err(|e| AppError::Internal(format!("Invalid selector {}: {}", css, e)))
        };
        Ok(Self {
            card: parse(CARD_SELECTOR)?,
            title: parse(TITLE_SELECTOR)?,
            brand: parse(BRAND_SELECTOR)?,
            price: parse(PRICE_SELECTOR)?,
            link: parse("a")?,
            image: parse("img")?,
        })
    }
}

fn element_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn element_attr<'a>(card: &ElementRef<'a>, selector: &Selector, attr: &str) -> Option<&'a str> {
    card.select(selector).next().and_then(|el| el.value().attr(attr))
}

pub struct StorefrontScraperSource {
    http_client: HttpClient,
    api_key: String,
    scraper_url: String,
    origin: url::Url,
    selectors: CardSelectors,
    limit: usize,
}

impl StorefrontScraperSource {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        scraper_url: String,
        storefront_url: &str,
        limit: usize,
    ) -> AppResult<Self> {
        let origin = url::Url::parse(storefront_url).map_err(|e| {
            AppError::Configuration(format!("Invalid STOREFRONT_URL {}: {}", storefront_url, e))
        })?;

        Ok(Self {
            http_client,
            api_key,
            scraper_url,
            origin,
            selectors: CardSelectors::compile()?,
            limit,
        })
    }

    fn category_url(&self, product_type: ProductType) -> AppResult<String> {
        self.origin
            .join(product_type.storefront_path())
            .map(|u| u.to_string())
            .map_err(|e| AppError::Internal(format!("Invalid category path: {}", e)))
    }

    /// Reads product cards out of a rendered category page
    ///
    /// Cards without a title are skipped; other missing fields get the same
    /// placeholders the JSON providers use.
    fn parse_cards(&self, html: &str, product_type: ProductType) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let s = &self.selectors;

        document
            .select(&s.card)
            .take(self.limit)
            .filter_map(|card| {
                let name = element_text(&card, &s.title)?;
                Some(ProductRecord {
                    name,
                    brand: element_text(&card, &s.brand)
                        .unwrap_or_else(|| "Unknown Brand".to_string()),
                    price: element_text(&card, &s.price)
                        .map(PriceValue::Text)
                        .unwrap_or_else(PriceValue::unavailable),
                    product_type,
                    link: absolute_link(&self.origin, element_attr(&card, &s.link, "href")),
                    image: element_attr(&card, &s.image, "src")
                        .unwrap_or_default()
                        .to_string(),
                    description: None,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductSource for StorefrontScraperSource {
    async fn fetch_products(&self, product_type: ProductType) -> AppResult<Vec<ProductRecord>> {
        let target = self.category_url(product_type)?;

        let response = self
            .http_client
            .get(&self.scraper_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", target.as_str()),
                ("render", "true"),
            ])
            .send()
            .await?;

        let response = ensure_success(response, "Scraper API").await?;
        let html = response.text().await?;
        let records = self.parse_cards(&html, product_type);

        tracing::info!(
            product_type = %product_type,
            page = %target,
            html_bytes = html.len(),
            results = records.len(),
            provider = self.name(),
            "Catalog fetch completed"
        );

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "storefront_scraper"
    }
}
