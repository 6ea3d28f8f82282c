//! Prompt text for the three routes

use cc_common::models::ClothingItem;
use cc_common::wardrobe::{format_wear_frequency, ItemUsage};
use chrono::{DateTime, Utc};

use crate::gemini::GenerationConfig;

pub const ANALYZE_CONFIG: GenerationConfig = GenerationConfig::new(0.2, 1024);
pub const OUTFITS_CONFIG: GenerationConfig = GenerationConfig::new(0.4, 2048);
pub const INSIGHTS_CONFIG: GenerationConfig = GenerationConfig::new(0.3, 4096);

pub const ANALYZE_PROMPT: &str = r#"Analyze this clothing item image and provide detailed information. Return a JSON object with these exact fields:

{
  "name": "descriptive name for this item (e.g., 'Navy Blue Crew Neck Sweater')",
  "category": "one of: Tops, Bottoms, Dresses, Outerwear, Shoes, Accessories, Underwear, Sleepwear, Activewear, Other",
  "color": "primary color (e.g., Black, White, Gray, Brown, Beige, Red, Pink, Orange, Yellow, Green, Blue, Purple, Navy, Burgundy, Gold, Silver, Multi-color)",
  "pattern": "solid, striped, plaid, floral, geometric, animal print, abstract, or other",
  "material": "best guess (cotton, polyester, wool, denim, silk, leather, etc.)",
  "style": "casual, formal, business casual, athleisure, vintage, trendy, classic",
  "season": "one of: Spring, Summer, Fall, Winter, All Seasons",
  "occasions": ["list of suitable occasions like work, casual, date night, workout, party"],
  "brand_guess": "if visible or recognizable, otherwise 'Unknown'",
  "condition": "excellent, good, fair, or poor based on visible wear",
  "care_tips": ["list of care recommendations"],
  "resale_potential": "high, medium, or low based on style/condition",
  "keep_donate_sell": "recommendation: keep, donate, or sell",
  "recommendation_reason": "brief explanation of why you suggest keep/donate/sell"
}

IMPORTANT: Return ONLY the JSON object, no markdown formatting or additional text."#;

/// `name (category, color, season)`
fn short_description(item: &ClothingItem) -> String {
    format!(
        "{} ({}, {}, {})",
        item.display_name(),
        item.category,
        item.color_label(),
        item.season_label()
    )
}

/// Stylist prompt for outfits built around `selected`
pub fn outfit_prompt(selected: &ClothingItem, wardrobe: &[ClothingItem], occasion: Option<&str>) -> String {
    let inventory = wardrobe
        .iter()
        .map(|item| format!("- {}", short_description(item)))
        .collect::<Vec<_>>()
        .join("\n");

    let focus = match occasion.map(str::trim).filter(|o| !o.is_empty()) {
        Some(occasion) => format!("Focus on outfits suitable for: {}", occasion),
        None => "Suggest outfits for various occasions (work, casual, date night, etc.)".to_string(),
    };

    format!(
        r#"You are a professional stylist. I want to create outfits using this item:

SELECTED ITEM: {selected}

MY WARDROBE:
{inventory}

{focus}

Suggest 3-5 complete outfit combinations that include the selected item. Return a JSON array with this structure:

[
  {{
    "name": "Outfit name (e.g., 'Smart Casual Friday')",
    "occasion": "work/casual/date night/formal/workout/etc.",
    "items": ["list of item names from the wardrobe that make up this outfit"],
    "styling_tips": "Brief styling advice for this combination",
    "confidence": 0.85
  }}
]

Rules:
1. Only use items from MY WARDROBE list
2. Create complete outfits (top + bottom minimum, add layers/accessories if available)
3. Consider color coordination and seasonal appropriateness
4. Confidence should be 0.0-1.0 based on how well items complement each other

IMPORTANT: Return ONLY the JSON array, no markdown formatting or additional text."#,
        selected = short_description(selected),
        inventory = inventory,
        focus = focus,
    )
}

/// One inventory line with usage figures
pub fn insights_line(item: &ClothingItem, now: DateTime<Utc>) -> String {
    let usage = ItemUsage::for_item(item, now);
    let price = item
        .known_price()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "ID: {} | {} | Category: {} | Color: {} | Season: {} | Worn {} times | Owned {} days | Wear rate: {}/month | Price: ${}",
        item.id,
        item.display_name(),
        item.category,
        item.color_label(),
        item.season_label(),
        item.wear_count,
        usage.days_owned,
        format_wear_frequency(usage.wear_frequency),
        price
    )
}

/// Decluttering-consultant prompt over the whole wardrobe
pub fn insights_prompt(items: &[ClothingItem], now: DateTime<Utc>) -> String {
    let inventory = items
        .iter()
        .map(|item| insights_line(item, now))
        .collect::<Vec<_>>()
        .join("\n");
    let count = items.len();

    format!(
        r#"You are a professional wardrobe consultant and decluttering expert. Analyze this wardrobe and provide recommendations.

WARDROBE INVENTORY ({count} items):
{inventory}

Analyze the wardrobe and return a JSON object with this structure:

{{
  "total_items": {count},
  "items_to_keep": <number>,
  "items_to_donate": <number>,
  "items_to_sell": <number>,
  "estimated_total_resale": <total estimated resale value in USD>,
  "category_breakdown": {{
    "Tops": <count>,
    "Bottoms": <count>,
    ... other categories
  }},
  "color_analysis": {{
    "dominant_colors": ["list of most common colors"],
    "missing_basics": ["colors/items the wardrobe is missing for versatility"]
  }},
  "seasonal_gaps": ["seasons that need more items"],
  "recommendations": [
    {{
      "item_id": "actual ID from the list",
      "item_name": "item name",
      "decision": "keep" | "donate" | "sell",
      "reason": "brief explanation",
      "estimated_resale_value": <if sell, estimated value in USD>,
      "urgency": "high" | "medium" | "low"
    }}
  ],
  "general_advice": ["3-5 actionable tips to improve the wardrobe"]
}}

Decision Criteria:
- KEEP: Items worn frequently (>2x/month), versatile basics, good condition
- DONATE: Items rarely worn (<1x/month for 3+ months), worn out, don't fit well
- SELL: Brand name items in good condition, trendy pieces with resale value
- Items never worn in 30+ days should be flagged as donate/sell

IMPORTANT: Return ONLY the JSON object, no markdown formatting or additional text. Include recommendations for EVERY item in the wardrobe."#,
        count = count,
        inventory = inventory,
    )
}
