//! Wardrobe record models
//!
//! Records are owned by the hosted backend; these types mirror its JSON.
//! Reading is deliberately lenient (unknown enum values, `null` counters,
//! blank timestamps) because records may have been written by other
//! clients. Writing goes through [`NewClothingItem`] and [`ItemUpdate`],
//! which only carry known values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Backend collection holding clothing items
pub const CLOTHING_ITEMS_COLLECTION: &str = "clothing_items";
/// Backend collection holding saved outfits
pub const OUTFITS_COLLECTION: &str = "outfits";
/// Backend auth collection
pub const USERS_COLLECTION: &str = "users";

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every value, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label as stored by the backend
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "unknown {} '{}' (expected one of: {})",
                            stringify!($name).to_lowercase(),
                            s,
                            $name::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                        ))
                    })
            }
        }
    };
}

string_enum! {
    /// Garment category
    pub enum Category {
        Tops => "Tops",
        Bottoms => "Bottoms",
        Dresses => "Dresses",
        Outerwear => "Outerwear",
        Shoes => "Shoes",
        Accessories => "Accessories",
        Underwear => "Underwear",
        Sleepwear => "Sleepwear",
        Activewear => "Activewear",
        Other => "Other",
    }
}

string_enum! {
    /// Primary garment color
    pub enum Color {
        Black => "Black",
        White => "White",
        Gray => "Gray",
        Brown => "Brown",
        Beige => "Beige",
        Red => "Red",
        Pink => "Pink",
        Orange => "Orange",
        Yellow => "Yellow",
        Green => "Green",
        Blue => "Blue",
        Purple => "Purple",
        Navy => "Navy",
        Burgundy => "Burgundy",
        Gold => "Gold",
        Silver => "Silver",
        MultiColor => "Multi-color",
    }
}

string_enum! {
    /// Season the garment is worn in
    pub enum Season {
        Spring => "Spring",
        Summer => "Summer",
        Fall => "Fall",
        Winter => "Winter",
        AllSeasons => "All Seasons",
    }
}

string_enum! {
    /// Garment size
    pub enum Size {
        Xxs => "XXS",
        Xs => "XS",
        S => "S",
        M => "M",
        L => "L",
        Xl => "XL",
        Xxl => "XXL",
        Xxxl => "3XL",
        Xxxxl => "4XL",
        OneSize => "One Size",
        Other => "Other",
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

/// Authenticated user record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub verified: bool,
}

/// Clothing item as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "collectionId")]
    pub collection_id: String,
    #[serde(default, rename = "collectionName")]
    pub collection_name: String,
    /// Owner user id
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_option")]
    pub color: Option<Color>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub size: Option<Size>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub season: Option<Season>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    /// Stored file name of the photo, if any
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wear_count: u32,
    #[serde(default, with = "crate::time::optional_datetime")]
    pub last_worn: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::optional_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::time::optional_datetime")]
    pub updated: Option<DateTime<Utc>>,
}

impl ClothingItem {
    /// Display name, falling back the way the closet view does
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed Item"
        } else {
            &self.name
        }
    }

    /// Color label, `Unknown` when unset
    pub fn color_label(&self) -> &str {
        self.color.as_ref().map(Color::as_str).unwrap_or("Unknown")
    }

    /// Season label, `Unknown` when unset
    pub fn season_label(&self) -> &str {
        self.season.as_ref().map(Season::as_str).unwrap_or("Unknown")
    }

    /// Purchase price when one was actually recorded (the backend reports
    /// an unset number field as `0`)
    pub fn known_price(&self) -> Option<f64> {
        self.purchase_price.filter(|p| *p > 0.0)
    }
}

/// Item creation form, as typed by the user
///
/// Price and tags stay as raw text; [`crate::validation`] turns them into
/// backend values.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClothingItem {
    pub name: String,
    pub category: Option<Category>,
    pub color: Option<Color>,
    pub brand: String,
    pub size: Option<Size>,
    pub season: Option<Season>,
    pub purchase_price: String,
    pub description: String,
    /// Comma-separated
    pub tags: String,
}

impl Default for NewClothingItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Some(Category::Tops),
            color: Some(Color::Black),
            brand: String::new(),
            size: Some(Size::M),
            season: Some(Season::AllSeasons),
            purchase_price: String::new(),
            description: String::new(),
            tags: String::new(),
        }
    }
}

/// Partial update of an existing item; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wear_count: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::time::optional_datetime::serialize"
    )]
    pub last_worn: Option<DateTime<Utc>>,
}

impl ItemUpdate {
    /// True when nothing would be sent
    pub fn is_empty(&self) -> bool {
        *self == ItemUpdate::default()
    }
}

/// Saved outfit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub occasion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    /// Referenced clothing item ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub clothing_items: Vec<String>,
    #[serde(default, with = "crate::time::optional_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expand: Option<OutfitExpand>,
}

/// Relations resolved by `expand=clothing_items`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfitExpand {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clothing_items: Vec<ClothingItem>,
}

/// Outfit creation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewOutfit {
    /// Owner; stamped by the store client
    pub user: String,
    pub name: String,
    pub occasion: String,
    pub notes: String,
    pub clothing_items: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Tags are a JSON field: usually an array, but older records hold the
/// array JSON-encoded as a string, and unset fields come back as `null`.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Encoded(String),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        Some(Tags::List(tags)) => tags,
        Some(Tags::Encoded(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        None => Vec::new(),
    })
}
