//! cc-store - client for the hosted wardrobe backend
//!
//! Wraps the backend-as-a-service REST API (PocketBase-compatible):
//! password auth, item and outfit records scoped to the signed-in owner,
//! file URLs, and realtime change subscriptions.
//!
//! ```rust,ignore
//! use cc_store::PocketBase;
//!
//! let pb = PocketBase::new("http://localhost:8090")?;
//! pb.auth_with_password("me@example.com", "secret").await?;
//! let items = pb.clothing_items().get_user_items(1, 20, None, None).await?;
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod files;
pub mod filter;
pub mod items;
pub mod outfits;
pub mod realtime;
pub mod records;

pub use auth::AuthState;
pub use client::PocketBase;
pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use items::{ClothingItems, ImageUpload};
pub use outfits::Outfits;
pub use realtime::{RecordAction, RecordEvent};
pub use records::{ListOptions, ListResult, RecordService};
