use super::rpc::TaskSendRequest;
use super::AgentKind;
use crate::config::Config;
use crate::error::{agent_error, AppResult};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Client for the external agent services.
///
/// Builds the JSON-RPC envelope, performs the HTTP call and returns the
/// upstream JSON body for the parsers. All failures surface as
/// `Error::Agent`; callers fall back to empty results.
pub struct AgentGateway {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl AgentGateway {
    /// Create a new gateway with a shared HTTP client
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Send a prompt to an agent wrapped in the standard envelope
    pub async fn send_task(&self, agent: AgentKind, prompt: &str) -> AppResult<Value> {
        let body = serde_json::to_value(TaskSendRequest::new(prompt))?;
        self.forward(agent, &body).await
    }

    /// Forward an already-enveloped request body to an agent verbatim
    pub async fn forward(&self, agent: AgentKind, body: &Value) -> AppResult<Value> {
        let url = {
            let config_read = self.config.read().await;
            config_read.agent_url(agent).to_string()
        };

        debug!("Forwarding request to {} agent at {}", agent.name(), url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| agent_error(&format!("Failed to reach {} agent: {}", agent.name(), e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Could not read error response"));
            return Err(agent_error(&format!(
                "{} agent returned HTTP {}: {}",
                agent.name(),
                status,
                upstream_message(&error_body)
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| agent_error(&format!("Invalid JSON from {} agent: {}", agent.name(), e)))
    }
}

/// Pull the `message` field out of a JSON error body, else keep it whole
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}
