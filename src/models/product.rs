use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Product categories the matchmaker can recommend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Foundation,
    Blush,
    Lipstick,
    Eyeshadow,
}

impl ProductType {
    pub const ALL: [ProductType; 4] = [
        ProductType::Foundation,
        ProductType::Blush,
        ProductType::Lipstick,
        ProductType::Eyeshadow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Foundation => "foundation",
            ProductType::Blush => "blush",
            ProductType::Lipstick => "lipstick",
            ProductType::Eyeshadow => "eyeshadow",
        }
    }

    /// Parses a form value, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }

    /// Category page path on the scraped storefront
    pub fn storefront_path(&self) -> &'static str {
        match self {
            ProductType::Foundation => "/shop/makeup/face/foundation",
            ProductType::Blush => "/shop/makeup/cheek/blush",
            ProductType::Lipstick => "/shop/makeup/lips/lipstick",
            ProductType::Eyeshadow => "/shop/makeup/eyes/eyeshadow",
        }
    }
}

impl Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A price as the provider sent it: a bare number or display text such as "$12.50"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    pub fn unavailable() -> Self {
        PriceValue::Text("Price unavailable".to_string())
    }

    /// Numeric reading of the price
    ///
    /// Text keeps only digits and `.`, then the longest leading decimal number
    /// is read. Returns `None` when nothing numeric remains or the value is
    /// negative.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) if n.is_finite() && *n >= 0.0 => Some(*n),
            PriceValue::Number(_) => None,
            PriceValue::Text(text) => parse_leading_decimal(text),
        }
    }

    /// Price used by the budget filter; unparsable prices count as zero
    pub fn filter_value(&self) -> f64 {
        self.numeric().unwrap_or(0.0)
    }
}

impl Display for PriceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceValue::Number(n) => write!(f, "{}", n),
            PriceValue::Text(text) => f.write_str(text),
        }
    }
}

fn parse_leading_decimal(text: &str) -> Option<f64> {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (idx, c) in stripped.char_indices() {
        match c {
            '.' if !seen_dot => seen_dot = true,
            '.' => break,
            _ => seen_digit = true,
        }
        end = idx + 1;
    }

    if !seen_digit {
        return None;
    }
    stripped[..end].trim_end_matches('.').parse().ok()
}

/// Normalized catalog entry, whichever provider it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub brand: String,
    pub price: PriceValue,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub link: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductRecord {
    /// Case-insensitive keyword match against name and description
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.name.to_lowercase().contains(&keyword)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> PriceValue {
        PriceValue::Text(s.to_string())
    }

    #[test]
    fn test_numeric_price_strips_currency() {
        assert_eq!(text("$12.50").numeric(), Some(12.5));
        assert_eq!(text("USD 8").numeric(), Some(8.0));
        assert_eq!(text("1,299.00").numeric(), Some(1299.0));
    }

    #[test]
    fn test_numeric_price_reads_leading_number_only() {
        assert_eq!(text("1.2.3").numeric(), Some(1.2));
        assert_eq!(text("$10.00 - $14.00").numeric(), Some(10.0014));
        assert_eq!(text(".5").numeric(), Some(0.5));
        assert_eq!(text("12.").numeric(), Some(12.0));
    }

    #[test]
    fn test_unparsable_price_filters_as_zero() {
        let price = PriceValue::unavailable();
        assert_eq!(price.numeric(), None);
        assert_eq!(price.filter_value(), 0.0);
        assert_eq!(text("").filter_value(), 0.0);
    }

    #[test]
    fn test_numeric_price_from_number() {
        assert_eq!(PriceValue::Number(9.99).numeric(), Some(9.99));
        assert_eq!(PriceValue::Number(-3.0).numeric(), None);
        assert_eq!(PriceValue::Number(f64::NAN).numeric(), None);
    }

    #[test]
    fn test_price_display_is_verbatim() {
        assert_eq!(text("$10.00").to_string(), "$10.00");
        assert_eq!(PriceValue::Number(10.0).to_string(), "10");
        assert_eq!(PriceValue::Number(9.5).to_string(), "9.5");
    }

    #[test]
    fn test_price_deserializes_from_either_shape() {
        let n: PriceValue = serde_json::from_str("7.5").unwrap();
        let s: PriceValue = serde_json::from_str("\"7.50\"").unwrap();
        assert_eq!(n, PriceValue::Number(7.5));
        assert_eq!(s, text("7.50"));
    }

    #[test]
    fn test_product_type_parse() {
        assert_eq!(ProductType::parse(" Lipstick "), Some(ProductType::Lipstick));
        assert_eq!(ProductType::parse("eyeshadow"), Some(ProductType::Eyeshadow));
        assert_eq!(ProductType::parse("mascara"), None);
    }

    #[test]
    fn test_mentions_checks_name_and_description() {
        let record = ProductRecord {
            name: "Velvet Matte Lip".to_string(),
            brand: "Acme".to_string(),
            price: text("9.00"),
            product_type: ProductType::Lipstick,
            link: "#".to_string(),
            image: String::new(),
            description: Some("A long-wearing DEWY glow".to_string()),
        };

        assert!(record.mentions("matte"));
        assert!(record.mentions("dewy"));
        assert!(!record.mentions("natural"));
    }
}
