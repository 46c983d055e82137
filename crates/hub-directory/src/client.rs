//! Supabase REST API client for the user directory.
//!
//! The `users` table is the authority for credentials and profiles.
//! Lookups are exact-match filters with `limit=1`; row bodies are never
//! logged, only a length/digest summary.

use async_trait::async_trait;
use hub_config::Config;
use hub_session::{AuthError, AuthResult, CredentialStore};
use hub_types::UserRecord;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const USER_COLUMNS: &str = "id,name,email,password,role,department,position,avatar_url";

pub(crate) fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Supabase REST API client for user directory operations.
#[derive(Clone)]
pub struct SupabaseDirectory {
    http_client: reqwest::Client,
    api_url: String,
    publishable_key: String,
}

impl SupabaseDirectory {
    /// Create a new directory client.
    ///
    /// # Arguments
    /// * `api_url` - The Supabase project API URL (e.g., `https://xyz.supabase.co`)
    /// * `publishable_key` - The Supabase publishable API key
    pub fn new(api_url: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
            publishable_key: publishable_key.into(),
        }
    }

    /// Create a directory client from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_publishable_key)
    }

    /// Build the REST API URL for a table.
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    async fn fetch_one(&self, filter: &str) -> AuthResult<Option<UserRecord>> {
        let url = format!(
            "{}?{}&select={}&limit=1",
            self.rest_url("users"),
            filter,
            USER_COLUMNS
        );

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.publishable_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.publishable_key),
            )
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Failed to fetch user");
            return Err(AuthError::Directory(format!(
                "Failed to fetch user: {} ({})",
                status, body_summary
            )));
        }

        let users: Vec<UserRecord> = response
            .json()
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;
        Ok(users.into_iter().next())
    }

    /// Insert a user record, merging on email conflicts.
    pub async fn create_user(&self, record: &UserRecord) -> AuthResult<()> {
        let url = format!("{}?on_conflict=email", self.rest_url("users"));

        tracing::debug!(user_id = %record.id, "Creating user in Supabase");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.publishable_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.publishable_key),
            )
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .json(record)
            .send()
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(status = %status, body_summary = %body_summary, "Failed to create user");
            return Err(AuthError::Directory(format!(
                "Failed to create user: {} ({})",
                status, body_summary
            )));
        }

        tracing::info!(user_id = %record.id, "User registered in Supabase");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SupabaseDirectory {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        tracing::debug!("Looking up user by email");
        self.fetch_one(&format!("email=eq.{}", email)).await
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<Option<UserRecord>> {
        tracing::debug!(user_id = %id, "Looking up user by id");
        self.fetch_one(&format!("id=eq.{}", id)).await
    }
}
