//! Supabase auth endpoints as the remote session layer.
//!
//! This service is best-effort by contract: transport problems come back
//! as `SoftFailure` so the session manager can log and keep going, while
//! a definite rejection from the service is a `HardFailure`.

use crate::client::summarize_response_body;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hub_session::{
    AuthError, ListenerId, RemoteEventListener, RemoteOutcome, RemoteSession, RemoteSessionEvent,
    RemoteSessionService,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: AuthUser,
}

#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    user_id: String,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Supabase auth client implementing the remote session service.
pub struct SupabaseAuth {
    http_client: reqwest::Client,
    api_url: String,
    publishable_key: String,
    token: Mutex<Option<TokenState>>,
    listeners: Mutex<HashMap<ListenerId, RemoteEventListener>>,
    next_listener_id: AtomicU64,
}

impl SupabaseAuth {
    /// Create a new auth client.
    pub fn new(api_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
            publishable_key: publishable_key.into(),
            token: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Create an auth client from the loaded configuration.
    pub fn from_config(config: &hub_config::Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_publishable_key)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, endpoint)
    }

    fn emit(&self, event: RemoteSessionEvent) {
        for listener in self.listeners.lock().unwrap().values() {
            listener(event.clone());
        }
    }

    fn clear_token(&self) {
        *self.token.lock().unwrap() = None;
    }
}

#[async_trait]
impl RemoteSessionService for SupabaseAuth {
    async fn active_session(&self) -> RemoteOutcome<Option<RemoteSession>> {
        let token = {
            let guard = self.token.lock().unwrap();
            match guard.as_ref() {
                Some(token) if !token.is_expired() => token.clone(),
                Some(_) => {
                    drop(guard);
                    debug!("Held access token expired");
                    self.clear_token();
                    return RemoteOutcome::Ok(None);
                }
                None => return RemoteOutcome::Ok(None),
            }
        };

        debug!(user_id = %token.user_id, "Validating held session");
        let response = match self
            .http_client
            .get(self.auth_url("user"))
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token.access_token))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return RemoteOutcome::SoftFailure(e.to_string()),
        };

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Access token no longer valid");
            self.clear_token();
            return RemoteOutcome::Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            warn!(status = %status, body_summary = %body_summary, "Session check failed");
            return RemoteOutcome::HardFailure(AuthError::Remote(format!(
                "Session check failed: {} ({})",
                status, body_summary
            )));
        }

        match response.json::<AuthUser>().await {
            Ok(user) => RemoteOutcome::Ok(Some(RemoteSession {
                user_id: user.id,
                email: user.email,
            })),
            Err(e) => RemoteOutcome::HardFailure(AuthError::Remote(e.to_string())),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteOutcome<()> {
        let response = match self
            .http_client
            .post(format!("{}?grant_type=password", self.auth_url("token")))
            .header("apikey", &self.publishable_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return RemoteOutcome::SoftFailure(e.to_string()),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            warn!(status = %status, body_summary = %body_summary, "Remote sign-in rejected");
            return RemoteOutcome::HardFailure(AuthError::Remote(format!(
                "Remote sign-in rejected: {} ({})",
                status, body_summary
            )));
        }

        let token: TokenResponse = match response.json().await {
            Ok(token) => token,
            Err(e) => return RemoteOutcome::HardFailure(AuthError::Remote(e.to_string())),
        };

        let user_id = token.user.id.clone();
        *self.token.lock().unwrap() = Some(TokenState {
            access_token: token.access_token,
            user_id: user_id.clone(),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        });

        debug!(%user_id, "Remote session established");
        self.emit(RemoteSessionEvent::SignedIn { user_id });
        RemoteOutcome::Ok(())
    }

    async fn sign_out(&self) -> RemoteOutcome<()> {
        let token = self.token.lock().unwrap().take();
        let Some(token) = token else {
            return RemoteOutcome::Ok(());
        };

        // The local session is gone regardless of what the endpoint says.
        self.emit(RemoteSessionEvent::SignedOut);

        let response = match self
            .http_client
            .post(self.auth_url("logout"))
            .header("apikey", &self.publishable_key)
            .header("Authorization", format!("Bearer {}", token.access_token))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return RemoteOutcome::SoftFailure(e.to_string()),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            warn!(status = %status, body_summary = %body_summary, "Remote sign-out rejected");
            return RemoteOutcome::HardFailure(AuthError::Remote(format!(
                "Remote sign-out rejected: {} ({})",
                status, body_summary
            )));
        }

        debug!("Remote session torn down");
        RemoteOutcome::Ok(())
    }

    fn subscribe(&self, listener: RemoteEventListener) -> ListenerId {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id);
    }
}
