//! Persistence of the Matrix login.
//!
//! The session directory holds two entries:
//! - `session`: JSON file with the access tokens and the last sync token
//! - `sqlite`: SQLite store of the Matrix SDK (room state, encryption keys)

use std::path::Path;

use log::{debug, trace, warn};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::utils::get_path;

/// Content of the `session` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    /// Access tokens and device of the bot
    user_session: matrix::MatrixSession,
    /// Latest sync token, to resume syncing where the bot stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Matrix session manager.
///
/// Loaded once at startup; the file is then only written to.
#[derive(Clone)]
pub struct MatrixSession {
    /// The session found on disk at startup, if any
    session: Option<Session>,
    /// Path to the SDK sqlite store
    sqlite_path: String,
    /// Path to the session file
    session_path: String,
}

impl MatrixSession {
    /// Opens the session directory `dir_path`, reading the session file if present.
    ///
    /// A missing or unreadable session file is not an error: the bot logs in
    /// again and overwrites it.
    pub async fn new(dir_path: &str) -> MatrixSession {
        let sqlite_path = get_path(dir_path, "sqlite");
        let session_path = get_path(dir_path, "session");
        debug!("session file {}, sqlite store {}", session_path, sqlite_path);

        let session = MatrixSession::read_session(&session_path).await;

        MatrixSession {
            session,
            sqlite_path,
            session_path,
        }
    }

    async fn read_session(session_path: &str) -> Option<Session> {
        let Ok(content) = fs::read_to_string(session_path).await else {
            debug!("no session file at {}", session_path);
            return None;
        };

        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("ignoring unreadable session file {}: {}", session_path, e);
                None
            }
        }
    }

    /// Whether a previous login was found on disk.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Path to the SQLite store of the SDK.
    pub fn sqlite_path(&self) -> &str {
        &self.sqlite_path
    }

    /// Previous login, if any.
    pub fn user_session(&self) -> Option<&matrix::MatrixSession> {
        self.session.as_ref().map(|s| &s.user_session)
    }

    /// Sync token stored by the previous run, if any.
    pub fn sync_token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Stores `sync_token` in the session file, keeping the login.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let content = fs::read_to_string(&self.session_path).await?;
        let mut session: Session = serde_json::from_str(&content)?;
        session.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        Ok(())
    }

    /// Writes a new session file for `user_session`, without sync token.
    pub async fn persist_user_session(
        &self,
        user_session: &matrix::MatrixSession,
    ) -> anyhow::Result<()> {
        trace!("persist user session");

        let session = Session {
            user_session: user_session.clone(),
            sync_token: None,
        };
        if let Some(dir) = Path::new(&self.session_path).parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        Ok(())
    }
}
