use futures::stream::{self, StreamExt};

use crate::{
    models::{ProductRecord, ProductType},
    services::{providers::ProductSource, throttle::RequestThrottle},
};

/// Builds the combined catalog for the selected categories
///
/// Issues one request per category through `source`. Every request passes
/// the shared throttle first, and at most `concurrency` are in flight at
/// once. A failed category is logged and contributes nothing; the others
/// still go through. Output keeps the order of `product_types`.
pub async fn retrieve_catalog(
    source: &dyn ProductSource,
    product_types: &[ProductType],
    throttle: &RequestThrottle,
    concurrency: usize,
) -> Vec<ProductRecord> {
    let per_category: Vec<Vec<ProductRecord>> = stream::iter(product_types.iter().copied())
        .map(|product_type| async move {
            throttle.acquire().await;
            match source.fetch_products(product_type).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        product_type = %product_type,
                        provider = source.name(),
                        error = %e,
                        "Catalog fetch failed, continuing without category"
                    );
                    Vec::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let catalog: Vec<ProductRecord> = per_category.into_iter().flatten().collect();

    tracing::info!(
        categories = product_types.len(),
        products = catalog.len(),
        provider = source.name(),
        "Catalog retrieved"
    );

    catalog
}
