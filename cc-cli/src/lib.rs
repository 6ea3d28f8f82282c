//! # ClosetClear command-line front end
//!
//! Pieces the `cc-cli` binary is assembled from:
//! - [`session`]: sign-in state kept in the data folder between runs
//! - [`ai_client`]: typed client for the cc-ai proxy routes
//! - [`render`]: plain-text views of items, outfits and insights
//! - [`sort`]: closet sort orders

pub mod ai_client;
pub mod render;
pub mod session;
pub mod sort;

pub use ai_client::{AiClient, AiClientError};
pub use session::SessionStore;
pub use sort::ClosetSort;
