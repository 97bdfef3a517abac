//! External user directory (Supabase REST) behind a trait seam so tests
//! can run against an in-memory implementation.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Error from a directory call, carrying enough upstream detail for the
/// duplicate-signup heuristic
#[derive(Debug, Clone)]
pub struct DirectoryError {
    /// Upstream HTTP status, when one was received
    pub status: Option<u16>,
    /// Upstream error code (Postgres codes for Supabase)
    pub code: Option<String>,
    pub message: String,
}

impl DirectoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// Best-effort duplicate detection: the directory does not expose a
    /// dedicated conflict signal, so this sniffs the Postgres unique
    /// violation code and the usual message text.
    pub fn is_duplicate(&self) -> bool {
        self.code.as_deref() == Some("23505") || self.message.contains("duplicate key")
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A user record to create at signup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

/// Directory of user profiles and signups
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Profiles matching an email, family members embedded
    async fn fetch_profiles(&self, email: &str) -> Result<Vec<Value>, DirectoryError>;

    /// Create a user record, erroring on duplicates
    async fn create_user(&self, user: &NewUser) -> Result<Value, DirectoryError>;
}

/// Supabase REST implementation
pub struct SupabaseDirectory {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl SupabaseDirectory {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn base_url_and_key(&self) -> (String, String) {
        let config_read = self.config.read().await;
        (
            config_read.supabase_url.clone(),
            config_read.supabase_key.clone(),
        )
    }
}

#[async_trait]
impl UserDirectory for SupabaseDirectory {
    async fn fetch_profiles(&self, email: &str) -> Result<Vec<Value>, DirectoryError> {
        let (base, key) = self.base_url_and_key().await;

        let mut url = Url::parse(&format!("{}/rest/v1/user_profiles", base))
            .map_err(|e| DirectoryError::new(format!("Invalid directory URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("select", "*,family_members(*)")
            .append_pair("email", &format!("eq.{}", email));

        let response = self
            .client
            .get(url)
            .header("apikey", &key)
            .header("Authorization", format!("Bearer {}", key))
            .send()
            .await
            .map_err(|e| DirectoryError::new(format!("Failed to fetch user profile: {}", e)))?;

        if !response.status().is_success() {
            return Err(directory_response_error(response).await);
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| DirectoryError::new(format!("Invalid profile response: {}", e)))
    }

    async fn create_user(&self, user: &NewUser) -> Result<Value, DirectoryError> {
        let (base, key) = self.base_url_and_key().await;

        // The REST insert takes an array of rows
        let response = self
            .client
            .post(format!("{}/rest/v1/users", base))
            .header("apikey", &key)
            .header("Authorization", format!("Bearer {}", key))
            .header("Prefer", "return=representation")
            .json(&json!([user]))
            .send()
            .await
            .map_err(|e| DirectoryError::new(format!("Failed to create user: {}", e)))?;

        if !response.status().is_success() {
            return Err(directory_response_error(response).await);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DirectoryError::new(format!("Invalid signup response: {}", e)))
    }
}

/// Build a DirectoryError from a non-2xx REST response, keeping the
/// upstream code and message when the body is JSON
async fn directory_response_error(response: reqwest::Response) -> DirectoryError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("Could not read error response"));

    let parsed = serde_json::from_str::<Value>(&body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v.get("code"))
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or(body);

    DirectoryError {
        status: Some(status),
        code,
        message,
    }
}

/// In-memory implementation of the directory (for testing)
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn fetch_profiles(&self, email: &str) -> Result<Vec<Value>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned().into_iter().collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<Value, DirectoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(DirectoryError {
                status: Some(409),
                code: Some(String::from("23505")),
                message: format!(
                    "duplicate key value violates unique constraint \"users_email_key\": {}",
                    user.email
                ),
            });
        }

        let record = json!({
            "full_name": user.full_name,
            "email": user.email,
            "phone": user.phone,
            "family_members": [],
        });
        users.insert(user.email.clone(), record.clone());
        Ok(json!([record]))
    }
}
