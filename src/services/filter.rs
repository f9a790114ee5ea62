use crate::{
    error::{AppError, AppResult},
    models::{Finish, ProductRecord},
};

/// What a catalog record must satisfy to be offered for ranking
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub budget: f64,
    /// When set, the finish keyword must appear in the name or description
    pub finish: Option<Finish>,
    /// Drop records whose price cannot be read instead of treating it as 0
    pub exclude_unpriced: bool,
}

impl FilterCriteria {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        let within_budget = match record.price.numeric() {
            Some(price) => price <= self.budget,
            None => !self.exclude_unpriced && record.price.filter_value() <= self.budget,
        };

        within_budget
            && self
                .finish
                .map_or(true, |finish| record.mentions(finish.keyword()))
    }
}

/// Applies budget and attribute filtering to the combined catalog
///
/// Returns `NoMatch` when nothing survives, so the ranking stage is never
/// called with an empty candidate list.
pub fn filter_catalog(
    catalog: Vec<ProductRecord>,
    criteria: &FilterCriteria,
) -> AppResult<Vec<ProductRecord>> {
    let total = catalog.len();
    let filtered: Vec<ProductRecord> = catalog
        .into_iter()
        .filter(|record| criteria.matches(record))
        .collect();

    tracing::info!(
        total = total,
        kept = filtered.len(),
        budget = criteria.budget,
        finish = ?criteria.finish,
        "Catalog filtered"
    );

    if filtered.is_empty() {
        return Err(AppError::NoMatch(format!(
            "No products found within your ${} budget",
            criteria.budget
        )));
    }

    Ok(filtered)
}
