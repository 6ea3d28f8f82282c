//! Turning model text into typed values
//!
//! Replies are asked to be bare JSON but often arrive wrapped in markdown
//! fences. After unwrapping, the text must parse as JSON (else
//! [`ReplyError::Parse`]) and then match the expected shape, including
//! value ranges (else [`ReplyError::Schema`]).

use cc_common::ai_types::{ClothingAnalysis, OutfitSuggestion, WardrobeInsights};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Reply is not valid JSON: {message}")]
    Parse { message: String, raw: String },

    #[error("Reply does not match the expected format: {message}")]
    Schema { message: String, raw: String },
}

impl ReplyError {
    /// The model text as received
    pub fn raw(&self) -> &str {
        match self {
            ReplyError::Parse { raw, .. } | ReplyError::Schema { raw, .. } => raw,
        }
    }
}

/// Remove a leading ```` ```json ```` or ```` ``` ```` and a trailing ```` ``` ````
pub fn strip_markdown_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// A reply type with range checks beyond what deserialization enforces
pub trait ReplyShape: DeserializeOwned {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Unwrap, parse and validate a model reply
pub fn parse_reply<T: ReplyShape>(raw: &str) -> Result<T, ReplyError> {
    let value: Value = serde_json::from_str(strip_markdown_fence(raw)).map_err(|e| ReplyError::Parse {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    let parsed: T = serde_json::from_value(value).map_err(|e| ReplyError::Schema {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    parsed.check().map_err(|message| ReplyError::Schema {
        message,
        raw: raw.to_string(),
    })?;

    Ok(parsed)
}

fn non_negative(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a non-negative number, got {}", field, value))
    }
}

impl ReplyShape for ClothingAnalysis {
    fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        Ok(())
    }
}

impl ReplyShape for Vec<OutfitSuggestion> {
    fn check(&self) -> Result<(), String> {
        for (i, outfit) in self.iter().enumerate() {
            if !(0.0..=1.0).contains(&outfit.confidence) {
                return Err(format!("outfit {}: confidence {} outside 0..1", i, outfit.confidence));
            }
            if outfit.items.is_empty() {
                return Err(format!("outfit {}: no items", i));
            }
        }
        Ok(())
    }
}

impl ReplyShape for WardrobeInsights {
    fn check(&self) -> Result<(), String> {
        non_negative("estimated_total_resale", self.estimated_total_resale)?;
        for rec in &self.recommendations {
            if let Some(value) = rec.estimated_resale_value {
                non_negative("estimated_resale_value", value)?;
            }
        }
        Ok(())
    }
}
