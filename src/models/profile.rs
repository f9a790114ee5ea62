use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ProductType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Dry,
    Oily,
    Combo,
    Normal,
}

impl SkinType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dry" => Some(SkinType::Dry),
            "oily" => Some(SkinType::Oily),
            "combo" | "combination" => Some(SkinType::Combo),
            "normal" => Some(SkinType::Normal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Oily => "oily",
            SkinType::Combo => "combo",
            SkinType::Normal => "normal",
        }
    }
}

impl Display for SkinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    Matte,
    Dewy,
    Natural,
}

impl Finish {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "matte" => Some(Finish::Matte),
            "dewy" => Some(Finish::Dewy),
            "natural" => Some(Finish::Natural),
            _ => None,
        }
    }

    /// Keyword matched against product text by the attribute filter
    pub fn keyword(&self) -> &'static str {
        match self {
            Finish::Matte => "matte",
            Finish::Dewy => "dewy",
            Finish::Natural => "natural",
        }
    }
}

impl Display for Finish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Validated preferences for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub skin_type: SkinType,
    pub finish: Finish,
    /// Positive and finite
    pub budget: f64,
    /// Non-empty, in submission order, without duplicates
    pub selected_types: Vec<ProductType>,
}
