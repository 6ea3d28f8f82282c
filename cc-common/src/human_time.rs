//! Human-readable formatting for wardrobe views
//!
//! Relative "last worn" labels, short dates and currency amounts.

use chrono::{DateTime, Utc};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Describe when an item was last worn.
///
/// Day counts are rounded up, so anything within the last 24 hours reads
/// as "Yesterday" and only an identical instant gives `0 days ago`:
/// - `< 7` days → `N days ago`
/// - `< 30` days → `N weeks ago`
/// - `< 365` days → `N months ago`
/// - otherwise → `N years ago`
///
/// # Examples
///
/// ```
/// use cc_common::human_time::format_last_worn;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// assert_eq!(format_last_worn(None, now), "Never worn");
/// assert_eq!(format_last_worn(Some(now - Duration::days(3)), now), "3 days ago");
/// assert_eq!(format_last_worn(Some(now - Duration::days(14)), now), "2 weeks ago");
/// ```
pub fn format_last_worn(last_worn: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_worn) = last_worn else {
        return "Never worn".to_string();
    };

    let diff_millis = (now - last_worn).num_milliseconds().abs();
    // Ceiling division
    let diff_days = (diff_millis + DAY_MILLIS - 1) / DAY_MILLIS;

    if diff_days == 1 {
        "Yesterday".to_string()
    } else if diff_days < 7 {
        format!("{} days ago", diff_days)
    } else if diff_days < 30 {
        format!("{} weeks ago", diff_days / 7)
    } else if diff_days < 365 {
        format!("{} months ago", diff_days / 30)
    } else {
        format!("{} years ago", diff_days / 365)
    }
}

/// Short date, e.g. `Mar 5, 2024`
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// US-dollar amount with thousands separators, e.g. `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, frac)
}
