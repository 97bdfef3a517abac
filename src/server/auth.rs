//! External login verification behind a trait seam.

use crate::config::Config;
use crate::error::{auth_error, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Verifies credentials against the external login API
#[async_trait]
pub trait LoginService: Send + Sync + 'static {
    /// Returns the login API's JSON reply; transport failures are errors,
    /// bad credentials are a reply without the success message
    async fn verify(&self, username: &str, password: &str) -> AppResult<Value>;
}

/// Whether a login API reply reports success
pub fn login_succeeded(reply: &Value) -> bool {
    reply
        .get("message")
        .and_then(Value::as_str)
        .map(|message| message.contains("Login successful"))
        .unwrap_or(false)
}

/// HTTP implementation against the configured login API
pub struct RemoteLoginService {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl RemoteLoginService {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LoginService for RemoteLoginService {
    async fn verify(&self, username: &str, password: &str) -> AppResult<Value> {
        let url = {
            let config_read = self.config.read().await;
            config_read.login_api_url.clone()
        };

        let response = self
            .client
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| auth_error(&format!("External login failed: {}", e)))?;

        // The login API answers 4xx with a JSON message body too
        response
            .json::<Value>()
            .await
            .map_err(|e| auth_error(&format!("Invalid login response: {}", e)))
    }
}
