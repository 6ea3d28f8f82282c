//! HTTP API handlers for cc-ai

pub mod analyze;
pub mod health;
pub mod insights;
pub mod outfits;

pub use health::health_routes;

use axum::routing::post;
use axum::Router;
use tracing::{error, warn};

use crate::error::{ApiError, ApiResult, UPSTREAM_FAILED_MESSAGE};
use crate::gemini::{GeminiClient, GeminiError, GenerationConfig, Part};
use crate::reply::{parse_reply, ReplyShape};
use crate::AppState;

/// The three model-backed routes
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze-item", post(analyze::analyze_item))
        .route("/api/outfit-suggestions", post(outfits::outfit_suggestions))
        .route("/api/wardrobe-insights", post(insights::wardrobe_insights))
}

/// User-facing messages that differ per route
pub(crate) struct RouteMessages {
    /// Provider answered but without text
    pub empty_reply: &'static str,
    /// Provider could not be reached or replied with garbage
    pub failure: &'static str,
}

/// Call the model once and decode its reply
pub(crate) async fn ask_model<T: ReplyShape>(
    gemini: &GeminiClient,
    parts: &[Part],
    config: GenerationConfig,
    messages: &RouteMessages,
) -> ApiResult<T> {
    let text = gemini.generate(parts, config).await.map_err(|e| match e {
        GeminiError::Api { status, body } => {
            error!(status, body = %body, "Model API error");
            ApiError::Upstream(UPSTREAM_FAILED_MESSAGE.to_string())
        }
        GeminiError::EmptyReply => {
            warn!("Model returned no text");
            ApiError::Upstream(messages.empty_reply.to_string())
        }
        other => {
            error!("Model call failed: {}", other);
            ApiError::Upstream(messages.failure.to_string())
        }
    })?;

    parse_reply(&text).map_err(|e| {
        error!(raw = %e.raw(), "Failed to use model reply: {}", e);
        ApiError::from(e)
    })
}

/// Log a failed request and remember it for `/health`
pub(crate) async fn finish<T>(state: &AppState, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(err) = &result {
        if err.status().is_server_error() {
            error!(code = err.code(), "Request failed: {}", err);
        } else {
            warn!(code = err.code(), "Request rejected: {}", err);
        }
        state.record_error(err).await;
    }
    result
}
