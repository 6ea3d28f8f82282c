//! Wardrobe arithmetic
//!
//! Item age, wear frequency, closet filtering and dashboard counts. All of
//! it is plain arithmetic over records already fetched from the backend;
//! `now` is always passed in so results are reproducible.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Category, ClothingItem, Color, Season};

/// Window for "recently added" on the dashboard
pub const RECENT_DAYS: i64 = 7;
/// Items not worn for this long need attention
pub const NEEDS_ATTENTION_DAYS: i64 = 30;
/// Number of recent items shown on the dashboard
pub const DASHBOARD_RECENT_LIMIT: usize = 6;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days between `created` and `now`, rounded down.
///
/// Items without a creation timestamp count as brand new.
pub fn days_owned(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match created {
        Some(created) => (now - created).num_milliseconds().div_euclid(MILLIS_PER_DAY),
        None => 0,
    }
}

/// Wears per month (30 days), or `None` when the item is not yet a day old
pub fn wear_frequency(wear_count: u32, days_owned: i64) -> Option<f64> {
    if days_owned > 0 {
        Some(wear_count as f64 / days_owned as f64 * 30.0)
    } else {
        None
    }
}

/// Wear frequency as shown to the model: one decimal, `0` when undefined.
///
/// Exact halves round up (`0.25` → `0.3`), unlike `{:.1}` which rounds
/// them to even.
pub fn format_wear_frequency(frequency: Option<f64>) -> String {
    match frequency {
        Some(f) => format!("{:.1}", round_half_up_tenths(f)),
        None => "0".to_string(),
    }
}

fn round_half_up_tenths(value: f64) -> f64 {
    // x.25 and x.75 are the only one-decimal ties a double holds exactly
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}

/// Per-item usage figures fed into the insights prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUsage {
    pub days_owned: i64,
    /// Wears per month
    pub wear_frequency: Option<f64>,
}

impl ItemUsage {
    pub fn for_item(item: &ClothingItem, now: DateTime<Utc>) -> Self {
        let days_owned = days_owned(item.created, now);
        Self {
            days_owned,
            wear_frequency: wear_frequency(item.wear_count, days_owned),
        }
    }
}

/// True when the item was never worn or not within the attention window
pub fn needs_attention(item: &ClothingItem, now: DateTime<Utc>) -> bool {
    match item.last_worn {
        Some(last_worn) => last_worn < now - Duration::days(NEEDS_ATTENTION_DAYS),
        None => true,
    }
}

/// True when the item was created within the "recently added" window
pub fn recently_added(item: &ClothingItem, now: DateTime<Utc>) -> bool {
    item.created
        .map(|created| created >= now - Duration::days(RECENT_DAYS))
        .unwrap_or(false)
}

/// Highest wear count; ties go to the later item
pub fn most_worn(items: &[ClothingItem]) -> Option<&ClothingItem> {
    items
        .iter()
        .reduce(|prev, current| if prev.wear_count > current.wear_count { prev } else { current })
}

/// Dashboard summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_items: u64,
    pub recently_added: u64,
    pub needs_attention: u64,
    /// Most worn among the recent items
    pub most_worn: Option<ClothingItem>,
    /// Newest first
    pub recent_items: Vec<ClothingItem>,
}

impl DashboardStats {
    /// Compute the dashboard from a full item list
    pub fn from_items(items: &[ClothingItem], now: DateTime<Utc>) -> Self {
        let mut recent: Vec<ClothingItem> = items.to_vec();
        recent.sort_by(|a, b| b.created.cmp(&a.created));
        recent.truncate(DASHBOARD_RECENT_LIMIT);

        Self {
            total_items: items.len() as u64,
            recently_added: items.iter().filter(|i| recently_added(i, now)).count() as u64,
            needs_attention: items.iter().filter(|i| needs_attention(i, now)).count() as u64,
            most_worn: most_worn(&recent).cloned(),
            recent_items: recent,
        }
    }
}

/// Closet browsing filter; `None` means "All"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosetFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub color: Option<Color>,
    pub season: Option<Season>,
}

impl ClosetFilter {
    /// Case-insensitive search over name, brand, category and color, plus
    /// exact matches on the selected category, color and season
    pub fn matches(&self, item: &ClothingItem) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = item.display_name().to_lowercase().contains(&term)
                || item.brand.to_lowercase().contains(&term)
                || item.category.as_str().to_lowercase().contains(&term)
                || item.color_label().to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        if self.color.is_some() && self.color != item.color {
            return false;
        }
        if self.season.is_some() && self.season != item.season {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, items: &'a [ClothingItem]) -> Vec<&'a ClothingItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
