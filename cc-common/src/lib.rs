//! # ClosetClear Common Library
//!
//! Shared code for the ClosetClear crates including:
//! - Wardrobe record models (clothing items, outfits)
//! - AI payload shapes shared by the proxy service and its callers
//! - Client-side form validation
//! - Wardrobe arithmetic (age, wear frequency, dashboard stats, filters)
//! - Configuration loading
//! - Human-readable formatting helpers

pub mod ai_types;
pub mod config;
pub mod error;
pub mod human_time;
pub mod models;
pub mod time;
pub mod validation;
pub mod wardrobe;

pub use error::{Error, Result};
pub use models::{Category, ClothingItem, Color, Outfit, Season, Size};
