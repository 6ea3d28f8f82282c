//! POST /api/wardrobe-insights

use std::collections::HashSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use cc_common::ai_types::{WardrobeInsights, WardrobeInsightsRequest, WardrobeInsightsResponse};
use cc_common::models::ClothingItem;
use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::{ask_model, finish, RouteMessages};
use crate::error::{ApiError, ApiResult};
use crate::gemini::Part;
use crate::prompts::{insights_prompt, INSIGHTS_CONFIG};
use crate::AppState;

const MISSING_INPUT: &str = "Wardrobe items are required";

const MESSAGES: RouteMessages = RouteMessages {
    empty_reply: "No insights returned from AI",
    failure: "Failed to generate wardrobe insights",
};

pub async fn wardrobe_insights(
    State(state): State<AppState>,
    body: Result<Json<WardrobeInsightsRequest>, JsonRejection>,
) -> ApiResult<Json<WardrobeInsightsResponse>> {
    let request_id = Uuid::new_v4();
    let result = analyze_wardrobe(&state, body)
        .instrument(info_span!("wardrobe_insights", %request_id))
        .await;
    finish(&state, result).await.map(Json)
}

async fn analyze_wardrobe(
    state: &AppState,
    body: Result<Json<WardrobeInsightsRequest>, JsonRejection>,
) -> ApiResult<WardrobeInsightsResponse> {
    let gemini = state.gemini()?;

    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.wardrobe_items.is_empty() {
        return Err(ApiError::BadRequest(MISSING_INPUT.to_string()));
    }

    info!(items = request.wardrobe_items.len(), "Analyzing wardrobe");

    let prompt = insights_prompt(&request.wardrobe_items, Utc::now());
    let mut insights: WardrobeInsights =
        ask_model(gemini, &[Part::Text(prompt)], INSIGHTS_CONFIG, &MESSAGES).await?;

    keep_known_recommendations(&mut insights, &request.wardrobe_items);
    info!(
        keep = insights.items_to_keep,
        donate = insights.items_to_donate,
        sell = insights.items_to_sell,
        "Wardrobe analyzed"
    );

    Ok(WardrobeInsightsResponse {
        success: true,
        insights,
    })
}

/// Drop recommendations whose `item_id` is not in the submitted wardrobe
pub fn keep_known_recommendations(insights: &mut WardrobeInsights, wardrobe: &[ClothingItem]) {
    let ids: HashSet<&str> = wardrobe.iter().map(|item| item.id.as_str()).collect();

    insights.recommendations.retain(|rec| {
        let known = ids.contains(rec.item_id.as_str());
        if !known {
            warn!(item_id = %rec.item_id, item_name = %rec.item_name, "Dropping recommendation for unknown item");
        }
        known
    });
}
