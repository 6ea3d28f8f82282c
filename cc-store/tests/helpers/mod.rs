//! In-process fake backend for store tests
//!
//! Serves the subset of the REST API the store client uses, keeps records
//! in memory, counts every request, and pushes record changes to realtime
//! subscribers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use futures::Stream;
use serde_json::{json, Map, Value};
use tokio::sync::broadcast;

pub const EMAIL: &str = "me@example.com";
pub const PASSWORD: &str = "hunter22";
pub const USER_ID: &str = "user_me";
pub const OTHER_USER_ID: &str = "user_other";

#[derive(Default)]
struct Records {
    items: Vec<Value>,
    outfits: Vec<Value>,
    tokens: HashMap<String, String>,
    next_id: u64,
    reset_requests: Vec<String>,
}

#[derive(Clone)]
pub struct FakeBackend {
    records: Arc<Mutex<Records>>,
    requests: Arc<AtomicUsize>,
    events: broadcast::Sender<String>,
}

impl FakeBackend {
    fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            records: Arc::new(Mutex::new(Records::default())),
            requests: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    /// Requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> usize {
        self.records.lock().unwrap().items.len()
    }

    pub fn items_owned_by(&self, user: &str) -> Vec<Value> {
        self.records
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|i| i["user"] == user)
            .cloned()
            .collect()
    }

    pub fn reset_requests(&self) -> Vec<String> {
        self.records.lock().unwrap().reset_requests.clone()
    }

    /// Insert an item directly, bypassing the API
    pub fn seed_item(&self, user: &str, name: &str, wear_count: u32) -> String {
        let mut records = self.records.lock().unwrap();
        records.next_id += 1;
        let id = format!("item{:04}", records.next_id);
        let next_id = records.next_id;
        records.items.push(json!({
            "id": id,
            "collectionId": "col_items",
            "collectionName": "clothing_items",
            "user": user,
            "name": name,
            "category": "Tops",
            "color": "Black",
            "wear_count": wear_count,
            "last_worn": "",
            "created": format!("2024-01-{:02} 10:00:00.000Z", (next_id % 28) + 1),
            "updated": "",
        }));
        id
    }

    fn publish(&self, action: &str, record: &Value) {
        let payload = json!({ "action": action, "record": record }).to_string();
        let _ = self.events.send(payload);
    }
}

pub fn token_for(user_id: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(json!({ "id": user_id, "exp": 4_102_444_800i64 }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{}.fake", payload)
}

/// Start the fake backend on an ephemeral port
pub async fn spawn_backend() -> (String, FakeBackend) {
    let backend = FakeBackend::new();

    let app = Router::new()
        .route("/api/collections/users/auth-with-password", post(auth_with_password))
        .route("/api/collections/users/auth-refresh", post(auth_refresh))
        .route("/api/collections/users/request-password-reset", post(password_reset))
        .route("/api/collections/users/records", post(register))
        .route("/api/collections/:collection/records", get(list_records).post(create_record))
        .route(
            "/api/collections/:collection/records/:id",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .route("/api/realtime", get(realtime_connect).post(realtime_subscribe))
        .layer(middleware::from_fn_with_state(backend.clone(), count_requests))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

async fn count_requests(State(backend): State<FakeBackend>, request: Request, next: Next) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

fn error(status: StatusCode, message: &str, data: Value) -> Response {
    (status, Json(json!({ "code": status.as_u16(), "message": message, "data": data }))).into_response()
}

fn caller(backend: &FakeBackend, headers: &HeaderMap) -> Option<String> {
    let token = headers.get("authorization")?.to_str().ok()?;
    backend.records.lock().unwrap().tokens.get(token).cloned()
}

fn user_record() -> Value {
    json!({ "id": USER_ID, "email": EMAIL, "name": "Me", "username": "me", "verified": true })
}

async fn auth_with_password(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    if body["identity"] != EMAIL || body["password"] != PASSWORD {
        return error(StatusCode::BAD_REQUEST, "Failed to authenticate.", json!({}));
    }
    let token = token_for(USER_ID);
    backend
        .records
        .lock()
        .unwrap()
        .tokens
        .insert(token.clone(), USER_ID.to_string());
    Json(json!({ "token": token, "record": user_record() })).into_response()
}

async fn auth_refresh(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match caller(&backend, &headers) {
        Some(_) => Json(json!({ "token": token_for(USER_ID), "record": user_record() })).into_response(),
        None => error(StatusCode::UNAUTHORIZED, "The request requires valid record authorization token to be set.", json!({})),
    }
}

async fn password_reset(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> StatusCode {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    backend.records.lock().unwrap().reset_requests.push(email);
    StatusCode::NO_CONTENT
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["password"] != body["passwordConfirm"] {
        return error(
            StatusCode::BAD_REQUEST,
            "Failed to create record.",
            json!({ "passwordConfirm": { "code": "validation_values_mismatch", "message": "Values don't match." } }),
        );
    }
    Json(json!({ "id": "user_new", "email": body["email"], "name": body["name"], "verified": false })).into_response()
}

/// Pull the owner id out of a `user = "..."` filter
fn owner_from_filter(filter: &str) -> Option<String> {
    let start = filter.find("user = \"")? + "user = \"".len();
    let rest = &filter[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

async fn list_records(
    State(backend): State<FakeBackend>,
    Path(collection): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if caller(&backend, &headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Missing auth token.", json!({}));
    }

    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = query.get("perPage").and_then(|p| p.parse().ok()).unwrap_or(30);
    let owner = query.get("filter").and_then(|f| owner_from_filter(f));

    let records = backend.records.lock().unwrap();
    let source = if collection == "outfits" { &records.outfits } else { &records.items };
    let mut matching: Vec<Value> = source
        .iter()
        .filter(|r| owner.as_deref().map_or(true, |o| r["user"] == o))
        .cloned()
        .collect();
    if query.get("sort").map_or(false, |s| s.starts_with('-')) {
        matching.reverse();
    }

    if collection == "outfits" && query.get("expand").map(String::as_str) == Some("clothing_items") {
        for outfit in matching.iter_mut() {
            let expanded: Vec<Value> = outfit["clothing_items"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .iter()
                .filter_map(|id| records.items.iter().find(|i| i["id"] == *id).cloned())
                .collect();
            outfit["expand"] = json!({ "clothing_items": expanded });
        }
    }

    let total = matching.len();
    let total_pages = if total == 0 { 0 } else { (total + per_page - 1) / per_page };
    let items: Vec<Value> = matching.into_iter().skip((page - 1) * per_page).take(per_page).collect();

    Json(json!({
        "page": page,
        "perPage": per_page,
        "totalItems": total,
        "totalPages": total_pages,
        "items": items,
    }))
    .into_response()
}

async fn create_record(
    State(backend): State<FakeBackend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    if caller(&backend, &headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Missing auth token.", json!({}));
    }

    let is_multipart = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("multipart/form-data"));

    let mut record = Map::new();
    if is_multipart {
        use axum::extract::FromRequest;
        let mut multipart = match Multipart::from_request(request, &()).await {
            Ok(m) => m,
            Err(e) => return e.into_response(),
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            if let Some(file_name) = field.file_name().map(str::to_string) {
                let _ = field.bytes().await;
                record.insert(name, Value::from(file_name));
                continue;
            }
            let text = field.text().await.unwrap_or_default();
            let value = match name.as_str() {
                "wear_count" => text.parse::<u64>().map(Value::from).unwrap_or(Value::Null),
                "purchase_price" => text.parse::<f64>().map(Value::from).unwrap_or(Value::Null),
                "tags" => serde_json::from_str(&text).unwrap_or(Value::Null),
                _ => Value::from(text),
            };
            record.insert(name, value);
        }
    } else {
        let bytes = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
            Ok(b) => b,
            Err(_) => return error(StatusCode::BAD_REQUEST, "Bad body.", json!({})),
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => record = map,
            _ => return error(StatusCode::BAD_REQUEST, "Bad body.", json!({})),
        }
    }

    if record.get("name").and_then(Value::as_str).map_or(true, |n| n.trim().is_empty()) && collection == "clothing_items" {
        return error(
            StatusCode::BAD_REQUEST,
            "Failed to create record.",
            json!({ "name": { "code": "validation_required", "message": "Missing required value." } }),
        );
    }

    let created = {
        let mut records = backend.records.lock().unwrap();
        records.next_id += 1;
        record.insert("id".into(), Value::from(format!("rec{:04}", records.next_id)));
        record.insert("collectionName".into(), Value::from(collection.clone()));
        record.insert("created".into(), Value::from("2024-06-01 12:00:00.000Z"));
        let created = Value::Object(record);
        if collection == "outfits" {
            records.outfits.push(created.clone());
        } else {
            records.items.push(created.clone());
        }
        created
    };

    if collection == "clothing_items" {
        backend.publish("create", &created);
    }
    Json(created).into_response()
}

async fn get_record(State(backend): State<FakeBackend>, Path((_collection, id)): Path<(String, String)>) -> Response {
    let records = backend.records.lock().unwrap();
    match records.items.iter().find(|i| i["id"] == id) {
        Some(item) => Json(item.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "The requested resource wasn't found.", json!({})),
    }
}

async fn update_record(
    State(backend): State<FakeBackend>,
    Path((_collection, id)): Path<(String, String)>,
    Json(changes): Json<Value>,
) -> Response {
    let updated = {
        let mut records = backend.records.lock().unwrap();
        let Some(item) = records.items.iter_mut().find(|i| i["id"] == id) else {
            return error(StatusCode::NOT_FOUND, "The requested resource wasn't found.", json!({}));
        };
        if let (Some(target), Some(changes)) = (item.as_object_mut(), changes.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        item.clone()
    };
    backend.publish("update", &updated);
    Json(updated).into_response()
}

async fn delete_record(State(backend): State<FakeBackend>, Path((_collection, id)): Path<(String, String)>) -> Response {
    let removed = {
        let mut records = backend.records.lock().unwrap();
        let before = records.items.len();
        let removed = records.items.iter().find(|i| i["id"] == id).cloned();
        records.items.retain(|i| i["id"] != id);
        if records.items.len() == before {
            return error(StatusCode::NOT_FOUND, "The requested resource wasn't found.", json!({}));
        }
        removed
    };
    if let Some(record) = removed {
        backend.publish("delete", &record);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn realtime_connect(State(backend): State<FakeBackend>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = backend.events.subscribe();
    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .id("client_1")
            .event("PB_CONNECT")
            .data(json!({ "clientId": "client_1" }).to_string()));

        loop {
            match rx.recv().await {
                Ok(payload) => yield Ok(Event::default().event("clothing_items/*").data(payload)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream)
}

async fn realtime_subscribe(Json(body): Json<Value>) -> Response {
    if body["clientId"] != "client_1" {
        return error(StatusCode::NOT_FOUND, "Missing or invalid client id.", json!({}));
    }
    StatusCode::NO_CONTENT.into_response()
}
