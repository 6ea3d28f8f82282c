//! cc-ai library interface
//!
//! Stateless proxy between the wardrobe front ends and the generative
//! model: item photo analysis, outfit suggestions and wardrobe insights.

pub mod api;
pub mod error;
pub mod gemini;
pub mod prompts;
pub mod reply;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::gemini::GeminiClient;

/// Largest accepted request body (10 MiB)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Model client; `None` when no API key is configured
    pub gemini: Option<Arc<GeminiClient>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(gemini: Option<GeminiClient>) -> Self {
        Self {
            gemini: gemini.map(Arc::new),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// The model client, or the configuration error every route reports
    pub fn gemini(&self) -> ApiResult<&GeminiClient> {
        self.gemini.as_deref().ok_or(ApiError::NotConfigured)
    }

    pub async fn record_error(&self, err: &ApiError) {
        *self.last_error.write().await = Some(format!("{}: {}", err.code(), err));
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ai_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
