//! Shared fixtures: a fake model API and request builders

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use cc_ai::gemini::GeminiClient;
use cc_ai::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};

pub const API_KEY: &str = "test-key";
pub const MODEL: &str = "gemini-1.5-flash";
pub const BOUNDARY: &str = "closetclear-test-boundary";

/// Canned replies plus a record of what was asked
#[derive(Clone)]
pub struct FakeModel {
    reply: Arc<Mutex<(StatusCode, Value)>>,
    last_request: Arc<Mutex<Option<Value>>>,
    last_call: Arc<Mutex<Option<(String, String)>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeModel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Body of the most recent call
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().unwrap().clone()
    }

    /// `(model:action path segment, key query parameter)` of the most recent call
    pub fn last_call(&self) -> Option<(String, String)> {
        self.last_call.lock().unwrap().clone()
    }

    /// Text of the first prompt part of the most recent call
    pub fn last_prompt(&self) -> String {
        self.last_request()
            .and_then(|r| r["contents"][0]["parts"][0]["text"].as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

/// Provider envelope around a text reply
pub fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

/// Start a fake model API answering every call with `status` / `body`
pub async fn spawn_model(status: StatusCode, body: Value) -> (String, FakeModel) {
    let model = FakeModel {
        reply: Arc::new(Mutex::new((status, body))),
        last_request: Arc::new(Mutex::new(None)),
        last_call: Arc::new(Mutex::new(None)),
        calls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/v1beta/models/:call", post(generate))
        .with_state(model.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), model)
}

async fn generate(
    State(model): State<FakeModel>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    model.calls.fetch_add(1, Ordering::SeqCst);
    *model.last_request.lock().unwrap() = Some(body);
    *model.last_call.lock().unwrap() = Some((call, query.get("key").cloned().unwrap_or_default()));

    let (status, reply) = model.reply.lock().unwrap().clone();
    (status, Json(reply)).into_response()
}

/// Router wired to the fake model at `url`
pub fn app_with_model(url: &str) -> Router {
    let client = GeminiClient::new(API_KEY, MODEL).unwrap().with_base_url(url);
    build_router(AppState::new(Some(client)))
}

/// Router with no model key configured
pub fn app_without_key() -> Router {
    build_router(AppState::new(None))
}

/// Router plus fake model replying 200 with `text`
pub async fn app_replying(text: &str) -> (Router, FakeModel) {
    let (url, model) = spawn_model(StatusCode::OK, text_reply(text)).await;
    (app_with_model(&url), model)
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart request with a single file field
pub fn multipart_request(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            field, file_name, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analyze-item")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// One wardrobe item in the camelCase request shape
pub fn wardrobe_item(id: &str, name: &str, category: &str, color: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": category,
        "color": color,
        "season": "All Seasons",
        "wear_count": 3,
        "purchase_price": 40,
        "created": "2024-01-01 10:00:00.000Z",
        "last_worn": ""
    })
}
