//! POST /api/analyze-item
//!
//! Multipart upload with an `image` field; replies with the model's
//! description of the garment.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cc_common::ai_types::{AnalyzeItemResponse, ClothingAnalysis};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{ask_model, finish, RouteMessages};
use crate::error::{ApiError, ApiResult};
use crate::gemini::{InlineData, Part};
use crate::prompts::{ANALYZE_CONFIG, ANALYZE_PROMPT};
use crate::AppState;

const NO_IMAGE: &str = "No image provided";
const DEFAULT_MIME: &str = "image/jpeg";

const MESSAGES: RouteMessages = RouteMessages {
    empty_reply: "No analysis returned from AI",
    failure: "Failed to analyze image",
};

/// Uploaded photo
struct ImagePart {
    mime_type: String,
    bytes: Vec<u8>,
}

pub async fn analyze_item(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeItemResponse>> {
    let request_id = Uuid::new_v4();
    let result = analyze(&state, multipart)
        .instrument(info_span!("analyze_item", %request_id))
        .await;
    finish(&state, result).await.map(Json)
}

async fn analyze(state: &AppState, multipart: Result<Multipart, MultipartRejection>) -> ApiResult<AnalyzeItemResponse> {
    let gemini = state.gemini()?;

    let mut multipart = multipart.map_err(|_| ApiError::BadRequest(NO_IMAGE.to_string()))?;
    let image = read_image(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::BadRequest(NO_IMAGE.to_string()))?;

    info!(mime_type = %image.mime_type, bytes = image.bytes.len(), "Analyzing item photo");

    let parts = [
        Part::Text(ANALYZE_PROMPT.to_string()),
        Part::InlineData(InlineData {
            mime_type: image.mime_type,
            data: STANDARD.encode(&image.bytes),
        }),
    ];

    let analysis: ClothingAnalysis = ask_model(gemini, &parts, ANALYZE_CONFIG, &MESSAGES).await?;
    info!(name = %analysis.name, decision = analysis.keep_donate_sell.as_str(), "Item analyzed");

    Ok(AnalyzeItemResponse {
        success: true,
        analysis,
    })
}

/// First `image` field, if any; a zero-byte upload still counts
async fn read_image(multipart: &mut Multipart) -> ApiResult<Option<ImagePart>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ApiError::BadRequest(format!("Invalid upload: {}", e.body_text()))),
        };
        if field.name() != Some("image") {
            continue;
        }

        let mime_type = field
            .content_type()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

        return Ok(Some(ImagePart {
            mime_type,
            bytes: bytes.to_vec(),
        }));
    }
}
