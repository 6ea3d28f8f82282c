//! Client-side form validation
//!
//! Runs before anything is sent to the backend: a form that fails here
//! never produces a network call.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::NewClothingItem;

/// Largest accepted photo upload (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Form validation failures, with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Item name is required")]
    NameRequired,

    #[error("Please select a category")]
    CategoryRequired,

    #[error("Please select a color")]
    ColorRequired,

    #[error("Please select a valid image file")]
    NotAnImage,

    #[error("Image size must be less than 5MB")]
    ImageTooLarge,
}

/// Check the item form the same way the add-item page does
pub fn validate_new_item(form: &NewClothingItem) -> Result<(), ValidationError> {
    if form.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if form.category.is_none() {
        return Err(ValidationError::CategoryRequired);
    }
    if form.color.is_none() {
        return Err(ValidationError::ColorRequired);
    }
    Ok(())
}

/// Check a photo before upload: `image/*` MIME type, at most 5 MiB
pub fn validate_image(mime_type: &str, size: usize) -> Result<(), ValidationError> {
    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::NotAnImage);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    Ok(())
}

/// Parse the free-text price field; only finite, non-negative values survive
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Split comma-separated tags, trimming and dropping empties
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the text fields of the creation request for a validated form.
///
/// `user` is the owner id; `wear_count` always starts at zero. Tags are
/// sent JSON-encoded because multipart bodies carry strings only.
pub fn item_form_fields(form: &NewClothingItem, user: &str) -> Result<Map<String, Value>, ValidationError> {
    validate_new_item(form)?;

    let mut fields = Map::new();
    fields.insert("name".into(), Value::from(form.name.trim()));
    if let Some(category) = form.category {
        fields.insert("category".into(), Value::from(category.as_str()));
    }
    if let Some(color) = form.color {
        fields.insert("color".into(), Value::from(color.as_str()));
    }
    fields.insert("brand".into(), Value::from(form.brand.trim()));
    if let Some(size) = form.size {
        fields.insert("size".into(), Value::from(size.as_str()));
    }
    if let Some(season) = form.season {
        fields.insert("season".into(), Value::from(season.as_str()));
    }
    fields.insert("description".into(), Value::from(form.description.trim()));
    fields.insert("user".into(), Value::from(user));
    fields.insert("wear_count".into(), Value::from(0));

    if let Some(price) = parse_price(&form.purchase_price) {
        fields.insert("purchase_price".into(), Value::from(price));
    }

    let tags = parse_tags(&form.tags);
    if !tags.is_empty() {
        fields.insert(
            "tags".into(),
            Value::from(serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string())),
        );
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Color};

    fn form(name: &str) -> NewClothingItem {
        NewClothingItem {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(validate_new_item(&form("")), Err(ValidationError::NameRequired));
        assert_eq!(validate_new_item(&form("   ")), Err(ValidationError::NameRequired));
        assert_eq!(ValidationError::NameRequired.to_string(), "Item name is required");
    }

    #[test]
    fn test_category_and_color_required() {
        let mut f = form("Shirt");
        f.category = None;
        assert_eq!(validate_new_item(&f), Err(ValidationError::CategoryRequired));

        f.category = Some(Category::Tops);
        f.color = None;
        assert_eq!(validate_new_item(&f), Err(ValidationError::ColorRequired));

        f.color = Some(Color::Red);
        assert!(validate_new_item(&f).is_ok());
    }

    #[test]
    fn test_image_limits() {
        assert!(validate_image("image/png", 1024).is_ok());
        assert!(validate_image("image/jpeg", MAX_IMAGE_BYTES).is_ok());
        assert_eq!(
            validate_image("image/jpeg", MAX_IMAGE_BYTES + 1),
            Err(ValidationError::ImageTooLarge)
        );
        assert_eq!(validate_image("application/pdf", 10), Err(ValidationError::NotAnImage));
        assert_eq!(validate_image("", 10), Err(ValidationError::NotAnImage));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("12.50"), Some(12.5));
        assert_eq!(parse_price(" 0 "), Some(0.0));
        assert_eq!(parse_price("-3"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("NaN"), None);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("work, casual,, summer ,"), vec!["work", "casual", "summer"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_form_fields() {
        let mut f = form("  Linen Shirt ");
        f.purchase_price = "abc".into();
        f.tags = "linen, summer".into();

        let fields = item_form_fields(&f, "user123").unwrap();
        assert_eq!(fields["name"], "Linen Shirt");
        assert_eq!(fields["category"], "Tops");
        assert_eq!(fields["season"], "All Seasons");
        assert_eq!(fields["user"], "user123");
        assert_eq!(fields["wear_count"], 0);
        assert_eq!(fields["tags"], "[\"linen\",\"summer\"]");
        assert!(!fields.contains_key("purchase_price"));
    }

    #[test]
    fn test_form_fields_rejects_invalid_form() {
        assert_eq!(item_form_fields(&form(""), "u"), Err(ValidationError::NameRequired));
    }
}
