//! Request and response shapes of the AI proxy routes
//!
//! Shared by the proxy service (which validates model replies against
//! these types) and by its callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Category, ClothingItem, Color, Season};

/// Keep / donate / sell verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    #[serde(alias = "Keep", alias = "KEEP")]
    Keep,
    #[serde(alias = "Donate", alias = "DONATE")]
    Donate,
    #[serde(alias = "Sell", alias = "SELL")]
    Sell,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Keep => "keep",
            Disposition::Donate => "donate",
            Disposition::Sell => "sell",
        }
    }
}

/// Three-step rating used for resale potential and urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Low", alias = "LOW")]
    Low,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

/// Attributes the vision model reads off a single photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingAnalysis {
    pub name: String,
    pub category: String,
    pub color: String,
    pub pattern: String,
    pub material: String,
    pub style: String,
    pub season: String,
    pub occasions: Vec<String>,
    pub brand_guess: String,
    pub condition: String,
    pub care_tips: Vec<String>,
    pub resale_potential: Level,
    pub keep_donate_sell: Disposition,
    pub recommendation_reason: String,
}

impl ClothingAnalysis {
    /// Category as a form value, when the model picked a known one
    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    /// Color as a form value, when the model picked a known one
    pub fn color(&self) -> Option<Color> {
        self.color.parse().ok()
    }

    /// Season as a form value, when the model picked a known one
    pub fn season(&self) -> Option<Season> {
        self.season.parse().ok()
    }

    /// Brand, unless the model could not tell
    pub fn brand(&self) -> Option<&str> {
        let brand = self.brand_guess.trim();
        if brand.is_empty() || brand.eq_ignore_ascii_case("unknown") {
            None
        } else {
            Some(brand)
        }
    }
}

/// One outfit combination proposed by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitSuggestion {
    pub name: String,
    pub occasion: String,
    /// Item names taken from the supplied inventory
    pub items: Vec<String>,
    pub styling_tips: String,
    /// 0.0 – 1.0
    pub confidence: f64,
}

/// Per-item keep/donate/sell advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecommendation {
    pub item_id: String,
    pub item_name: String,
    pub decision: Disposition,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_resale_value: Option<f64>,
    pub urgency: Level,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    pub dominant_colors: Vec<String>,
    pub missing_basics: Vec<String>,
}

/// Whole-wardrobe summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeInsights {
    pub total_items: u32,
    pub items_to_keep: u32,
    pub items_to_donate: u32,
    pub items_to_sell: u32,
    pub estimated_total_resale: f64,
    pub category_breakdown: BTreeMap<String, u32>,
    pub color_analysis: ColorAnalysis,
    pub seasonal_gaps: Vec<String>,
    pub recommendations: Vec<ItemRecommendation>,
    pub general_advice: Vec<String>,
}

impl WardrobeInsights {
    /// Recommendations with the given verdict, or all of them for `None`
    pub fn recommendations_for(
        &self,
        decision: Option<Disposition>,
    ) -> impl Iterator<Item = &ItemRecommendation> {
        self.recommendations
            .iter()
            .filter(move |rec| decision.map_or(true, |d| rec.decision == d))
    }
}

/// `POST /api/outfit-suggestions` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSuggestionRequest {
    #[serde(default)]
    pub selected_item: Option<ClothingItem>,
    #[serde(default)]
    pub wardrobe_items: Vec<ClothingItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

/// `POST /api/wardrobe-insights` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeInsightsRequest {
    #[serde(default)]
    pub wardrobe_items: Vec<ClothingItem>,
}

/// `POST /api/analyze-item` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeItemResponse {
    pub success: bool,
    pub analysis: ClothingAnalysis,
}

/// `POST /api/outfit-suggestions` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitSuggestionsResponse {
    pub success: bool,
    #[serde(rename = "selectedItem")]
    pub selected_item: String,
    pub suggestions: Vec<OutfitSuggestion>,
}

/// `POST /api/wardrobe-insights` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeInsightsResponse {
    pub success: bool,
    pub insights: WardrobeInsights,
}

/// Error body returned by every proxy route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Model reply echoed for diagnostics when it could not be used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}
