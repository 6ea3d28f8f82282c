//! HTTP plumbing shared by every backend call

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::auth::AuthState;
use crate::error::{ApiErrorBody, StoreError, StoreResult};
use crate::records::RecordService;

const USER_AGENT: &str = concat!("ClosetClear/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend client
///
/// Cheap to clone; clones share the HTTP connection pool and the auth
/// state, so signing in through one clone signs in all of them.
#[derive(Clone)]
pub struct PocketBase {
    http: Client,
    base_url: String,
    pub(crate) auth: Arc<watch::Sender<AuthState>>,
}

impl PocketBase {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> StoreResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let (auth, _) = watch::channel(AuthState::default());

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: Arc::new(auth),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (which must start with `/`)
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Record operations on one collection
    pub fn collection(&self, name: &str) -> RecordService<'_> {
        RecordService::new(self, name)
    }

    /// Request builder carrying the auth token, if any.
    ///
    /// The backend expects the raw token in `Authorization`, no scheme.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.build_url(path);
        debug!(method = %method, url = %url, "Backend request");

        let builder = self.http.request(method, url);
        let token = self.auth.borrow().token.clone();
        if token.is_empty() {
            builder
        } else {
            builder.header(reqwest::header::AUTHORIZATION, token)
        }
    }

    /// Send and decode a JSON response
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    /// Send, expecting no meaningful body (e.g. `204 No Content`)
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> StoreResult<()> {
        self.execute(request).await?;
        Ok(())
    }

    /// Send and turn non-2xx statuses into [`StoreError::Api`]
    pub(crate) async fn execute(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
        let (message, data) = match body {
            Some(body) if !body.message.is_empty() => (body.message, body.data),
            Some(body) => (status.to_string(), body.data),
            None => (text, serde_json::Value::Null),
        };

        debug!(status = status.as_u16(), message = %message, "Backend returned error");

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
            data,
        })
    }
}
