//! Plain-text views
//!
//! Every function returns the text instead of printing it so the views can
//! be checked in tests.

use std::fmt::Write;

use cc_common::ai_types::{ClothingAnalysis, Disposition, OutfitSuggestionsResponse, WardrobeInsights};
use cc_common::human_time::{format_currency, format_date, format_last_worn};
use cc_common::models::{ClothingItem, Outfit};
use cc_common::wardrobe::{format_wear_frequency, DashboardStats, ItemUsage};
use chrono::{DateTime, Utc};

/// One line per item in the closet listing
pub fn item_line(item: &ClothingItem, now: DateTime<Utc>) -> String {
    format!(
        "{:<15}  {:<28}  {:<11}  {:<11}  worn {:>3}x  ({})",
        item.id,
        truncate(item.display_name(), 28),
        item.category.as_str(),
        item.color_label(),
        item.wear_count,
        format_last_worn(item.last_worn, now)
    )
}

pub fn item_list(items: &[&ClothingItem], total: usize, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "{}", item_line(item, now));
    }
    let _ = write!(out, "Showing {} of {} items", items.len(), total);
    out
}

/// Full item card
pub fn item_detail(item: &ClothingItem, image_url: &str, now: DateTime<Utc>) -> String {
    let usage = ItemUsage::for_item(item, now);
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", item.display_name(), item.id);
    let _ = writeln!(out, "  Category:   {}", item.category);
    let _ = writeln!(out, "  Color:      {}", item.color_label());
    let _ = writeln!(out, "  Season:     {}", item.season_label());
    if let Some(size) = &item.size {
        let _ = writeln!(out, "  Size:       {}", size);
    }
    if !item.brand.is_empty() {
        let _ = writeln!(out, "  Brand:      {}", item.brand);
    }
    if let Some(price) = item.known_price() {
        let _ = writeln!(out, "  Price:      {}", format_currency(price));
    }
    if !item.tags.is_empty() {
        let _ = writeln!(out, "  Tags:       {}", item.tags.join(", "));
    }
    if !item.description.is_empty() {
        let _ = writeln!(out, "  Notes:      {}", item.description);
    }
    let _ = writeln!(
        out,
        "  Worn:       {} times, last {}",
        item.wear_count,
        format_last_worn(item.last_worn, now).to_lowercase()
    );
    let _ = writeln!(
        out,
        "  Frequency:  {} wears/month over {} days",
        format_wear_frequency(usage.wear_frequency),
        usage.days_owned
    );
    if let Some(created) = &item.created {
        let _ = writeln!(out, "  Added:      {}", format_date(created));
    }
    if !image_url.is_empty() {
        let _ = writeln!(out, "  Photo:      {}", image_url);
    }
    out.trim_end().to_string()
}

pub fn dashboard(stats: &DashboardStats, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total items:      {}", stats.total_items);
    let _ = writeln!(out, "Added this week:  {}", stats.recently_added);
    let _ = writeln!(out, "Need attention:   {}", stats.needs_attention);
    match &stats.most_worn {
        Some(item) => {
            let _ = writeln!(out, "Most worn:        {} ({}x)", item.display_name(), item.wear_count);
        }
        None => {
            let _ = writeln!(out, "Most worn:        -");
        }
    }

    if stats.recent_items.is_empty() {
        let _ = write!(out, "\nYour closet is empty. Add your first item with `cc-cli add`.");
    } else {
        let _ = writeln!(out, "\nRecent items:");
        for item in &stats.recent_items {
            let _ = writeln!(out, "  {}", item_line(item, now));
        }
    }
    out.trim_end().to_string()
}

pub fn analysis(analysis: &ClothingAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", analysis.name);
    let _ = writeln!(
        out,
        "  {} / {} / {} / {}",
        analysis.category, analysis.color, analysis.season, analysis.style
    );
    let _ = writeln!(out, "  Material: {}, pattern: {}", analysis.material, analysis.pattern);
    if let Some(brand) = analysis.brand() {
        let _ = writeln!(out, "  Brand guess: {}", brand);
    }
    let _ = writeln!(out, "  Condition: {}", analysis.condition);
    if !analysis.occasions.is_empty() {
        let _ = writeln!(out, "  Occasions: {}", analysis.occasions.join(", "));
    }
    for tip in &analysis.care_tips {
        let _ = writeln!(out, "  - {}", tip);
    }
    let _ = writeln!(
        out,
        "  Verdict: {} (resale potential {}): {}",
        analysis.keep_donate_sell.as_str(),
        analysis.resale_potential.as_str(),
        analysis.recommendation_reason
    );
    out.trim_end().to_string()
}

pub fn suggestions(reply: &OutfitSuggestionsResponse) -> String {
    if reply.suggestions.is_empty() {
        return format!("No outfits found for {}", reply.selected_item);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Outfits with {}:", reply.selected_item);
    for (n, outfit) in reply.suggestions.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}. {} [{}] {:.0}% match",
            n + 1,
            outfit.name,
            outfit.occasion,
            outfit.confidence * 100.0
        );
        let _ = writeln!(out, "   {}", outfit.items.join(" + "));
        if !outfit.styling_tips.is_empty() {
            let _ = writeln!(out, "   Tip: {}", outfit.styling_tips);
        }
    }
    out.trim_end().to_string()
}

pub fn outfit(outfit: &Outfit) -> String {
    let names: Vec<&str> = match &outfit.expand {
        Some(expand) if !expand.clothing_items.is_empty() => {
            expand.clothing_items.iter().map(ClothingItem::display_name).collect()
        }
        _ => outfit.clothing_items.iter().map(String::as_str).collect(),
    };

    let mut line = format!("{}  {}", outfit.id, outfit.name);
    if !outfit.occasion.is_empty() {
        let _ = write!(line, " [{}]", outfit.occasion);
    }
    let _ = write!(line, ": {}", names.join(" + "));
    line
}

/// Insight summary plus the recommendations matching `decision`
pub fn insights(insights: &WardrobeInsights, decision: Option<Disposition>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Items reviewed:    {}", insights.total_items);
    let _ = writeln!(out, "Keep:              {}", insights.items_to_keep);
    let _ = writeln!(out, "Donate:            {}", insights.items_to_donate);
    let _ = writeln!(out, "Sell:              {}", insights.items_to_sell);
    let _ = writeln!(
        out,
        "Est. resale value: {}",
        format_currency(insights.estimated_total_resale)
    );

    if !insights.category_breakdown.is_empty() {
        let breakdown: Vec<String> = insights
            .category_breakdown
            .iter()
            .map(|(category, count)| format!("{} {}", category, count))
            .collect();
        let _ = writeln!(out, "Categories:        {}", breakdown.join(", "));
    }
    if !insights.color_analysis.dominant_colors.is_empty() {
        let _ = writeln!(
            out,
            "Dominant colors:   {}",
            insights.color_analysis.dominant_colors.join(", ")
        );
    }
    if !insights.color_analysis.missing_basics.is_empty() {
        let _ = writeln!(
            out,
            "Missing basics:    {}",
            insights.color_analysis.missing_basics.join(", ")
        );
    }
    if !insights.seasonal_gaps.is_empty() {
        let _ = writeln!(out, "Seasonal gaps:     {}", insights.seasonal_gaps.join(", "));
    }

    let heading = match decision {
        Some(d) => format!("Recommendations ({})", d.as_str()),
        None => "Recommendations".to_string(),
    };
    let _ = writeln!(out, "\n{}:", heading);
    let mut any = false;
    for rec in insights.recommendations_for(decision) {
        any = true;
        let value = rec
            .estimated_resale_value
            .map(|v| format!(", ~{}", format_currency(v)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  [{}] {} ({} urgency{}): {}",
            rec.decision.as_str(),
            rec.item_name,
            rec.urgency.as_str(),
            value,
            rec.reason
        );
    }
    if !any {
        let _ = writeln!(out, "  none");
    }

    if !insights.general_advice.is_empty() {
        let _ = writeln!(out, "\nAdvice:");
        for tip in &insights.general_advice {
            let _ = writeln!(out, "  - {}", tip);
        }
    }
    out.trim_end().to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
