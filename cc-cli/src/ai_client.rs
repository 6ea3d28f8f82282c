//! Client for the cc-ai proxy routes

use cc_common::ai_types::{
    AnalyzeItemResponse, ClothingAnalysis, ErrorResponse, OutfitSuggestionRequest,
    OutfitSuggestionsResponse, WardrobeInsights, WardrobeInsightsRequest, WardrobeInsightsResponse,
};
use cc_common::models::ClothingItem;
use cc_store::ImageUpload;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AiClientError {
    #[error("AI service unreachable: {0}")]
    Network(String),

    /// Non-2xx answer; `message` is the service's `error` field when present
    #[error("{message}")]
    Service {
        status: u16,
        message: String,
        code: Option<String>,
        raw: Option<String>,
    },

    #[error("Unexpected AI service response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AiClientError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            AiClientError::Parse(err.to_string())
        } else {
            AiClientError::Network(err.to_string())
        }
    }
}

pub type AiResult<T> = Result<T, AiClientError>;

#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Describe a garment photo
    pub async fn analyze_image(&self, image: &ImageUpload) -> AiResult<ClothingAnalysis> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| AiClientError::Network(e.to_string()))?;
        let form = Form::new().part("image", part);

        debug!(file = %image.file_name, bytes = image.bytes.len(), "Requesting item analysis");
        let response = self
            .http
            .post(self.url("/api/analyze-item"))
            .multipart(form)
            .send()
            .await?;

        let body: AnalyzeItemResponse = read_body(response).await?;
        Ok(body.analysis)
    }

    /// Outfits built around `selected` from the rest of the wardrobe
    pub async fn suggest_outfits(
        &self,
        selected: &ClothingItem,
        wardrobe: &[ClothingItem],
        occasion: Option<&str>,
    ) -> AiResult<OutfitSuggestionsResponse> {
        let request = OutfitSuggestionRequest {
            selected_item: Some(selected.clone()),
            wardrobe_items: wardrobe.to_vec(),
            occasion: occasion.map(str::to_string),
        };

        debug!(item_id = %selected.id, wardrobe = wardrobe.len(), "Requesting outfit suggestions");
        let response = self
            .http
            .post(self.url("/api/outfit-suggestions"))
            .json(&request)
            .send()
            .await?;

        read_body(response).await
    }

    /// Keep/donate/sell review of the whole wardrobe
    pub async fn wardrobe_insights(&self, wardrobe: &[ClothingItem]) -> AiResult<WardrobeInsights> {
        let request = WardrobeInsightsRequest {
            wardrobe_items: wardrobe.to_vec(),
        };

        debug!(items = wardrobe.len(), "Requesting wardrobe insights");
        let response = self
            .http
            .post(self.url("/api/wardrobe-insights"))
            .json(&request)
            .send()
            .await?;

        let body: WardrobeInsightsResponse = read_body(response).await?;
        Ok(body.insights)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> AiResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let error = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => AiClientError::Service {
            status: status.as_u16(),
            message: body.error,
            code: body.code,
            raw: body.raw,
        },
        Err(_) => AiClientError::Service {
            status: status.as_u16(),
            message: format!("AI service returned {}", status),
            code: None,
            raw: (!text.is_empty()).then_some(text),
        },
    };
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn item(id: &str, name: &str) -> ClothingItem {
        serde_json::from_value(json!({ "id": id, "name": name, "category": "Tops" })).unwrap()
    }

    #[tokio::test]
    async fn test_suggestions_posted_in_camel_case() {
        let router = Router::new().route(
            "/api/outfit-suggestions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["selectedItem"]["id"], "a1");
                assert_eq!(body["wardrobeItems"].as_array().unwrap().len(), 1);
                assert_eq!(body["occasion"], "work");
                Json(json!({
                    "success": true,
                    "selectedItem": "Shirt",
                    "suggestions": [{
                        "name": "Office",
                        "occasion": "work",
                        "items": ["Shirt", "Chinos"],
                        "styling_tips": "Tuck it in",
                        "confidence": 0.9
                    }]
                }))
            }),
        );
        let client = AiClient::new(spawn(router).await);

        let reply = client
            .suggest_outfits(&item("a1", "Shirt"), &[item("b2", "Chinos")], Some("work"))
            .await
            .unwrap();

        assert_eq!(reply.selected_item, "Shirt");
        assert_eq!(reply.suggestions.len(), 1);
        assert_eq!(reply.suggestions[0].items, vec!["Shirt", "Chinos"]);
    }

    #[tokio::test]
    async fn test_error_body_surfaces_message_and_code() {
        let router = Router::new().route(
            "/api/wardrobe-insights",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to parse AI response",
                        "code": "PARSE_ERROR",
                        "raw": "not json"
                    })),
                )
            }),
        );
        let client = AiClient::new(spawn(router).await);

        let err = client.wardrobe_insights(&[item("a1", "Shirt")]).await.unwrap_err();
        match err {
            AiClientError::Service { status, message, code, raw } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to parse AI response");
                assert_eq!(code.as_deref(), Some("PARSE_ERROR"));
                assert_eq!(raw.as_deref(), Some("not json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Nothing listens on port 9 locally
        let client = AiClient::new("http://127.0.0.1:9/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");

        let image = ImageUpload {
            file_name: "shirt.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };
        let err = client.analyze_image(&image).await.unwrap_err();
        assert!(matches!(err, AiClientError::Network(_)));
    }
}
