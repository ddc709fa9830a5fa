//! In-memory login sessions.
//!
//! Sessions do not survive a restart. Ids are 64 random bytes encoded as
//! unpadded url-safe base64.

use std::collections::HashMap;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// How long a session stays valid after login.
pub const SESSION_TTL_DAYS: i64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Starts a session. Expired sessions are pruned first.
    pub async fn create(&self, user_id: Uuid) -> ResultEngine<Session> {
        let now = Utc::now();
        let session = Session {
            id: new_session_id()?,
            user_id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, live| live.expires_at > now);
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    /// Returns a live session. Expired sessions are dropped on lookup.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(id).cloned()?;
        if session.expires_at <= Utc::now() {
            self.sessions.write().await.remove(id);
            return None;
        }
        Some(session)
    }

    pub async fn delete(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

fn new_session_id() -> ResultEngine<String> {
    let mut bytes = [0u8; 64];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| EngineError::Hashing(format!("session id: {err}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
