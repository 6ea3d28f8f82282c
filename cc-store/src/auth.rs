//! Password authentication and the shared auth store

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cc_common::models::{UserRecord, USERS_COLLECTION};
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::PocketBase;
use crate::error::{StoreError, StoreResult};

/// Token plus the user it belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub token: String,
    pub record: Option<UserRecord>,
}

impl AuthState {
    /// Token present and not past its `exp` claim
    pub fn is_valid(&self) -> bool {
        if self.token.is_empty() {
            return false;
        }
        match token_expiry(&self.token) {
            Some(exp) => exp > Utc::now().timestamp(),
            None => false,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.record.as_ref().map(|r| r.id.as_str())
    }
}

/// Read the `exp` claim of a JWT without verifying it
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    record: UserRecord,
}

impl PocketBase {
    /// Snapshot of the current auth state
    pub fn auth_state(&self) -> AuthState {
        self.auth.borrow().clone()
    }

    /// Restore a previously saved auth state
    pub fn set_auth(&self, state: AuthState) {
        self.auth.send_replace(state);
    }

    /// Listen for sign-in / sign-out changes
    pub fn on_auth_change(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.borrow().is_valid()
    }

    pub fn current_user(&self) -> Option<UserRecord> {
        self.auth.borrow().record.clone()
    }

    /// Id of the signed-in user, or [`StoreError::NotAuthenticated`]
    pub fn require_user_id(&self) -> StoreResult<String> {
        self.auth
            .borrow()
            .user_id()
            .map(str::to_string)
            .ok_or(StoreError::NotAuthenticated)
    }

    /// Sign in with email and password
    pub async fn auth_with_password(&self, email: &str, password: &str) -> StoreResult<UserRecord> {
        let path = format!("/api/collections/{}/auth-with-password", USERS_COLLECTION);
        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "identity": email, "password": password }));

        let auth: AuthResponse = self.send(request).await?;
        info!(user_id = %auth.record.id, "Signed in");

        self.set_auth(AuthState {
            token: auth.token,
            record: Some(auth.record.clone()),
        });
        Ok(auth.record)
    }

    /// Create an account; does not sign in
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> StoreResult<UserRecord> {
        let path = format!("/api/collections/{}/records", USERS_COLLECTION);
        let request = self.request(Method::POST, &path).json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "passwordConfirm": password_confirm,
        }));
        self.send(request).await
    }

    /// Exchange the current token for a fresh one.
    ///
    /// Any failure signs the user out.
    pub async fn auth_refresh(&self) -> StoreResult<UserRecord> {
        if !self.is_authenticated() {
            return Err(StoreError::NotAuthenticated);
        }

        let path = format!("/api/collections/{}/auth-refresh", USERS_COLLECTION);
        let result: StoreResult<AuthResponse> = self.send(self.request(Method::POST, &path)).await;

        match result {
            Ok(auth) => {
                self.set_auth(AuthState {
                    token: auth.token,
                    record: Some(auth.record.clone()),
                });
                Ok(auth.record)
            }
            Err(e) => {
                warn!("Auth refresh failed, signing out: {}", e);
                self.logout();
                Err(e)
            }
        }
    }

    /// Ask the backend to email a password-reset link
    pub async fn request_password_reset(&self, email: &str) -> StoreResult<()> {
        let path = format!("/api/collections/{}/request-password-reset", USERS_COLLECTION);
        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "email": email }));
        self.send_empty(request).await
    }

    /// Forget the token locally
    pub fn logout(&self) {
        self.set_auth(AuthState::default());
    }
}
