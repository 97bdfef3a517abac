use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(concierge::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(concierge::config))]
    Config(String),

    #[error("Agent error: {0}")]
    #[diagnostic(code(concierge::agent))]
    Agent(String),

    #[error("Login API error: {0}")]
    #[diagnostic(code(concierge::auth))]
    Auth(String),

    #[error("User directory error: {0}")]
    #[diagnostic(code(concierge::directory))]
    Directory(String),

    #[error("Session error: {0}")]
    #[diagnostic(code(concierge::session))]
    Session(String),

    #[error(transparent)]
    #[diagnostic(code(concierge::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(concierge::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(concierge::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for JSON serialization errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create agent errors
pub fn agent_error(message: &str) -> Error {
    Error::Agent(message.to_string())
}

/// Helper to create login API errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create user directory errors
pub fn directory_error(message: &str) -> Error {
    Error::Directory(message.to_string())
}

/// Helper to create session errors
pub fn session_error(message: &str) -> Error {
    Error::Session(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
