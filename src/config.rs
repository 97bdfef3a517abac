use crate::agent::AgentKind;
use crate::error::{env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 5001;

/// Default file used to persist the client session between runs
pub const DEFAULT_SESSION_FILE: &str = "config/session.json";

/// Main configuration structure for the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Public data agent endpoint
    pub public_data_agent_url: String,
    /// Preference create agent endpoint
    pub preference_create_agent_url: String,
    /// Calendar agent endpoint
    pub calendar_agent_url: String,
    /// Preference query agent endpoint
    pub preference_query_agent_url: String,
    /// Gift recommendation agent endpoint
    pub gift_recommend_agent_url: String,
    /// External login verification API
    pub login_api_url: String,
    /// User directory (Supabase REST) base URL
    pub supabase_url: String,
    /// User directory API key
    pub supabase_key: String,
    /// Path of the persisted session file
    pub session_file: String,
}

impl Config {
    /// Load configuration from environment and the optional agents override file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let supabase_url = env::var("SUPABASE_URL").map_err(|_| env_error("SUPABASE_URL"))?;
        let supabase_key = env::var("SUPABASE_KEY").map_err(|_| env_error("SUPABASE_KEY"))?;

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        // Agent endpoints default to local agent processes
        let public_data_agent_url = env::var("PUBLIC_DATA_AGENT_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10011/public-data-agent"));
        let preference_create_agent_url = env::var("PREFERENCE_CREATE_AGENT_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10012/preference-agent"));
        let calendar_agent_url = env::var("CALENDAR_AGENT_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10013/calendar-agent"));
        let preference_query_agent_url = env::var("PREFERENCE_QUERY_AGENT_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10012/preference-agent"));
        let gift_recommend_agent_url = env::var("GIFT_RECOMMEND_AGENT_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10014/gift-agent"));

        let login_api_url = env::var("LOGIN_API_URL")
            .unwrap_or_else(|_| String::from("http://127.0.0.1:10010/check/login"));

        let session_file =
            env::var("SESSION_FILE").unwrap_or_else(|_| String::from(DEFAULT_SESSION_FILE));

        let mut config = Config {
            port,
            public_data_agent_url,
            preference_create_agent_url,
            calendar_agent_url,
            preference_query_agent_url,
            gift_recommend_agent_url,
            login_api_url,
            supabase_url,
            supabase_key,
            session_file,
        };

        // Load agent URL overrides from file if it exists
        if let Ok(content) = fs::read_to_string("config/agents.toml") {
            if let Ok(overrides) = toml::from_str::<HashMap<String, String>>(&content) {
                for (key, url) in overrides {
                    config.set_agent_url(&key, url);
                }
            }
        }

        Ok(config)
    }

    /// Resolve the endpoint URL for an agent
    pub fn agent_url(&self, agent: AgentKind) -> &str {
        match agent {
            AgentKind::PublicData => &self.public_data_agent_url,
            AgentKind::PreferenceCreate => &self.preference_create_agent_url,
            AgentKind::Calendar => &self.calendar_agent_url,
            AgentKind::PreferenceQuery => &self.preference_query_agent_url,
            AgentKind::GiftRecommend => &self.gift_recommend_agent_url,
        }
    }

    /// Override an agent URL by its config key, ignoring unknown keys
    fn set_agent_url(&mut self, key: &str, url: String) {
        match key {
            "public_data" => self.public_data_agent_url = url,
            "preference_create" => self.preference_create_agent_url = url,
            "calendar" => self.calendar_agent_url = url,
            "preference_query" => self.preference_query_agent_url = url,
            "gift_recommend" => self.gift_recommend_agent_url = url,
            _ => {}
        }
    }
}
