//! Persisted client session: the user record and preferences returned at
//! login, stored verbatim between runs and cleared on logout.

use crate::error::{session_error, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: Value,
    #[serde(default)]
    pub preferences: Option<Value>,
}

/// File-backed session store with a load/save/clear lifecycle.
///
/// The in-memory copy is authoritative; every save writes through to the
/// file so the session survives restarts.
pub struct SessionStore {
    path: PathBuf,
    state: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open the store, loading a previously persisted session if present.
    /// A corrupt file is discarded with a warning.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Discarding unreadable session file {:?}: {}", path, e);
                    let _ = fs::remove_file(&path);
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path,
            state: RwLock::new(state),
        }
    }

    /// Current session, if a user is logged in
    pub async fn get(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    /// Replace the session and persist it
    pub async fn save(&self, session: Session) -> AppResult<()> {
        let mut state = self.state.write().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&session)
            .map_err(|e| session_error(&format!("Failed to serialize session: {}", e)))?;
        fs::write(&self.path, content)?;

        *state = Some(session);
        Ok(())
    }

    /// Drop the session and remove the file
    pub async fn clear(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        *state = None;
        Ok(())
    }
}
