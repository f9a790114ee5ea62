use std::fmt::Write as _;

use crate::{
    error::{AppError, AppResult},
    models::{ProductRecord, Recommendation, UserProfile},
};

const RESPONSE_FORMAT: &str = r#"Return ONLY a valid JSON array in this format:
[{
  "name": "Product Name",
  "brand": "Brand Name",
  "type": "product type",
  "price": "XX.XX",
  "why": "Brief explanation",
  "link": "product_url",
  "image": "image_url"
}]"#;

const STRICT_FORMAT_REMINDER: &str = "Your previous answer could not be parsed. \
Respond with the JSON array and nothing else: no prose, no Markdown code fences, \
and every object must include name, brand, type and why.";

/// Builds the ranking prompt
///
/// Lists up to `max_candidates` products as `i. brand name (type) - price`
/// followed by the user's profile and the required output format.
pub fn build_prompt(
    candidates: &[ProductRecord],
    profile: &UserProfile,
    estimated_tone: Option<&str>,
    max_candidates: usize,
) -> String {
    let mut prompt = String::from(
        "As a professional makeup artist, recommend 3-5 products from this list:\n",
    );

    for (i, p) in candidates.iter().take(max_candidates).enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {} {} ({}) - {}",
            i + 1,
            p.brand,
            p.name,
            p.product_type,
            p.price
        );
    }

    prompt.push_str("\nUser Profile:\n");
    let _ = writeln!(prompt, "- Skin Type: {}", profile.skin_type);
    if let Some(tone) = estimated_tone {
        let _ = writeln!(prompt, "- Estimated Skin Tone: {}", tone);
    }
    let _ = writeln!(prompt, "- Preferred Finish: {}", profile.finish);
    let _ = writeln!(prompt, "- Budget: ${}", profile.budget);

    let categories: Vec<&str> = profile.selected_types.iter().map(|t| t.as_str()).collect();
    let _ = write!(
        prompt,
        "\nRequirements:\n\
         1. Include at least one product from each selected category ({})\n\
         2. Prioritize products matching the user's skin type and finish preference\n\
         3. Stay within budget\n\n",
        categories.join(", ")
    );
    prompt.push_str(RESPONSE_FORMAT);

    prompt
}

/// Body of the first Markdown code fence, minus an optional `json` tag
fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let after = after
        .strip_prefix("json")
        .or_else(|| after.strip_prefix("JSON"))
        .unwrap_or(after);
    let end = after.find("```")?;
    Some(after[..end].trim())
}

fn bracketed(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Locates the JSON array in free text
///
/// Looks inside a code fence first, then falls back to the span from the
/// first `[` to the last `]` of the whole reply.
pub fn extract_json_array(text: &str) -> Option<&str> {
    strip_code_fence(text)
        .and_then(bracketed)
        .or_else(|| bracketed(text))
}

/// Parses the generator's reply into typed recommendations
///
/// Any miss (no array, invalid JSON, schema mismatch, empty list) is a
/// `RecommendationParse` error; nothing is partially returned.
pub fn parse_recommendations(text: &str) -> AppResult<Vec<Recommendation>> {
    let json = extract_json_array(text)
        .ok_or_else(|| AppError::RecommendationParse("no JSON array in response".to_string()))?;

    let recommendations: Vec<Recommendation> = serde_json::from_str(json)
        .map_err(|e| AppError::RecommendationParse(format!("invalid recommendation JSON: {}", e)))?;

    if recommendations.is_empty() {
        return Err(AppError::RecommendationParse(
            "response contained an empty array".to_string(),
        ));
    }

    Ok(recommendations)
}

/// The original prompt followed by a stricter output instruction, used when
/// the previous reply could not be parsed
pub fn with_format_reminder(prompt: &str) -> String {
    format!("{}\n\n{}", prompt, STRICT_FORMAT_REMINDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finish, PriceValue, ProductType, SkinType};

    fn product(brand: &str, name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            brand: brand.to_string(),
            price: PriceValue::Text(price.to_string()),
            product_type: ProductType::Lipstick,
            link: "#".to_string(),
            image: String::new(),
            description: None,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            skin_type: SkinType::Dry,
            finish: Finish::Matte,
            budget: 25.0,
            selected_types: vec![ProductType::Lipstick],
        }
    }

    const VALID: &str = r#"[{"name": "Ruby Woo", "brand": "MAC", "type": "lipstick", "price": "19.00", "why": "Matte red", "link": "https://mac.example/ruby"}]"#;

    #[test]
    fn test_prompt_lists_candidates_and_profile() {
        let prompt = build_prompt(
            &[product("MAC", "Ruby Woo", "$10.00")],
            &profile(),
            Some("medium"),
            15,
        );

        assert!(prompt.contains("1. MAC Ruby Woo (lipstick) - $10.00"));
        assert!(prompt.contains("- Skin Type: dry"));
        assert!(prompt.contains("- Estimated Skin Tone: medium"));
        assert!(prompt.contains("- Preferred Finish: matte"));
        assert!(prompt.contains("- Budget: $25"));
        assert!(prompt.contains("Return ONLY a valid JSON array"));
    }

    #[test]
    fn test_prompt_caps_candidates() {
        let candidates: Vec<_> = (0..20)
            .map(|i| product("Brand", &format!("Shade {}", i), "5"))
            .collect();

        let prompt = build_prompt(&candidates, &profile(), None, 15);
        assert!(prompt.contains("15. Brand Shade 14"));
        assert!(!prompt.contains("16. "));
        assert!(!prompt.contains("Estimated Skin Tone"));
    }

    #[test]
    fn test_extracts_array_from_prose() {
        let text = format!("Sure! Here are my picks:\n{}\nHope this helps.", VALID);
        assert_eq!(extract_json_array(&text), Some(VALID));
    }

    #[test]
    fn test_extracts_array_from_code_fence() {
        let text = format!("```json\n{}\n```", VALID);
        assert_eq!(extract_json_array(&text), Some(VALID));
    }

    #[test]
    fn test_fence_without_array_falls_back_to_whole_text() {
        let text = format!("```\nnothing here\n``` but later {}", VALID);
        assert_eq!(extract_json_array(&text), Some(VALID));
    }

    #[test]
    fn test_parse_valid_response() {
        let recs = parse_recommendations(VALID).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "Ruby Woo");
        assert_eq!(recs[0].why, "Matte red");
    }

    #[test]
    fn test_parse_without_brackets_fails() {
        let err = parse_recommendations("I recommend Ruby Woo by MAC.").unwrap_err();
        assert!(matches!(err, AppError::RecommendationParse(_)));
    }

    #[test]
    fn test_parse_invalid_json_fails() {
        let err = parse_recommendations(r#"[{"name": "Ruby Woo", }]"#).unwrap_err();
        assert!(matches!(err, AppError::RecommendationParse(_)));
    }

    #[test]
    fn test_parse_schema_mismatch_fails() {
        let err = parse_recommendations(r#"[{"name": "Ruby Woo"}]"#).unwrap_err();
        assert!(matches!(err, AppError::RecommendationParse(_)));
    }

    #[test]
    fn test_parse_empty_array_fails() {
        let err = parse_recommendations("[]").unwrap_err();
        assert!(matches!(err, AppError::RecommendationParse(_)));
    }

    #[test]
    fn test_parse_accepts_null_link() {
        let text = r#"[{"name": "Ruby Woo", "brand": "MAC", "type": "lipstick", "why": "w", "link": null}]"#;
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].link, None);
    }

    #[test]
    fn test_format_reminder_keeps_original_prompt() {
        let retry = with_format_reminder("rank these");
        assert!(retry.starts_with("rank these\n\n"));
        assert!(retry.contains("could not be parsed"));
    }
}
