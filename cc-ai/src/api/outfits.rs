//! POST /api/outfit-suggestions

use std::collections::HashSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use cc_common::ai_types::{OutfitSuggestion, OutfitSuggestionRequest, OutfitSuggestionsResponse};
use cc_common::models::ClothingItem;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::{ask_model, finish, RouteMessages};
use crate::error::{ApiError, ApiResult};
use crate::gemini::Part;
use crate::prompts::{outfit_prompt, OUTFITS_CONFIG};
use crate::AppState;

const MISSING_INPUT: &str = "Selected item and wardrobe items are required";

const MESSAGES: RouteMessages = RouteMessages {
    empty_reply: "No suggestions returned from AI",
    failure: "Failed to generate outfit suggestions",
};

pub async fn outfit_suggestions(
    State(state): State<AppState>,
    body: Result<Json<OutfitSuggestionRequest>, JsonRejection>,
) -> ApiResult<Json<OutfitSuggestionsResponse>> {
    let request_id = Uuid::new_v4();
    let result = suggest(&state, body)
        .instrument(info_span!("outfit_suggestions", %request_id))
        .await;
    finish(&state, result).await.map(Json)
}

async fn suggest(
    state: &AppState,
    body: Result<Json<OutfitSuggestionRequest>, JsonRejection>,
) -> ApiResult<OutfitSuggestionsResponse> {
    let gemini = state.gemini()?;

    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let selected = request
        .selected_item
        .ok_or_else(|| ApiError::BadRequest(MISSING_INPUT.to_string()))?;
    if request.wardrobe_items.is_empty() {
        return Err(ApiError::BadRequest(MISSING_INPUT.to_string()));
    }

    info!(
        selected = %selected.display_name(),
        wardrobe = request.wardrobe_items.len(),
        occasion = request.occasion.as_deref().unwrap_or("any"),
        "Suggesting outfits"
    );

    let prompt = outfit_prompt(&selected, &request.wardrobe_items, request.occasion.as_deref());
    let suggestions: Vec<OutfitSuggestion> =
        ask_model(gemini, &[Part::Text(prompt)], OUTFITS_CONFIG, &MESSAGES).await?;

    let suggestions = keep_inventory_items(suggestions, &selected, &request.wardrobe_items);
    info!(count = suggestions.len(), "Outfits suggested");

    Ok(OutfitSuggestionsResponse {
        success: true,
        selected_item: selected.name,
        suggestions,
    })
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Drop outfit items the user does not own; outfits left empty are dropped
pub fn keep_inventory_items(
    suggestions: Vec<OutfitSuggestion>,
    selected: &ClothingItem,
    wardrobe: &[ClothingItem],
) -> Vec<OutfitSuggestion> {
    let owned: HashSet<String> = wardrobe
        .iter()
        .chain(std::iter::once(selected))
        .map(|item| name_key(item.display_name()))
        .collect();

    suggestions
        .into_iter()
        .filter_map(|mut outfit| {
            outfit.items.retain(|name| {
                let known = owned.contains(&name_key(name));
                if !known {
                    warn!(outfit = %outfit.name, item = %name, "Dropping item not in wardrobe");
                }
                known
            });
            if outfit.items.is_empty() {
                warn!(outfit = %outfit.name, "Dropping outfit with no wardrobe items");
                None
            } else {
                Some(outfit)
            }
        })
        .collect()
}
