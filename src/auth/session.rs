//! Session management
//!
//! Sessions live in a server-side table keyed by a random id.
//! The client holds `base64(id).base64(hmac_sha256(id))`; the signature lets
//! forged or truncated tokens be rejected before touching the table.
//! Sessions end on logout or process restart; there is no expiry.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::data::User;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const SESSION_ID_BYTES: usize = 32;

/// Server-side record proving a client has authenticated
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque id (base64url of 32 random bytes)
    pub session_id: String,
    /// Id of the authenticated user
    pub user_id: String,
    /// Username, denormalized for display
    pub username: String,
    /// When the session was issued
    pub created_at: DateTime<Utc>,
}

/// Issues, resolves and destroys sessions
pub struct SessionManager {
    secret: Vec<u8>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    /// Create a session manager
    ///
    /// # Arguments
    /// * `secret` - HMAC key used to sign tokens handed to clients
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid session key: {e}")))
    }

    /// Create a session for `user` and return the signed token
    pub async fn issue(&self, user: &User) -> Result<String, AppError> {
        let mut id_bytes = [0u8; SESSION_ID_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut id_bytes);
        let session_id = URL_SAFE_NO_PAD.encode(id_bytes);

        let mut mac = self.mac()?;
        mac.update(session_id.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let session = Session {
            session_id: session_id.clone(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            created_at: Utc::now(),
        };

        let live = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session_id.clone(), session);
            sessions.len()
        };
        crate::metrics::SESSIONS_ACTIVE.set(live as i64);

        Ok(format!("{}.{}", session_id, signature))
    }

    /// Verify the token signature and return the session id it carries
    fn verified_id<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (session_id, signature_b64) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(session_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(session_id)
    }

    /// Look up a live session by token
    ///
    /// Returns `None` for forged, malformed, never-issued or destroyed tokens.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let session_id = self.verified_id(token)?;
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Remove a session; a no-op when it is already gone
    pub async fn destroy(&self, token: &str) {
        let Some(session_id) = self.verified_id(token) else {
            return;
        };

        let live = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id);
            sessions.len()
        };
        crate::metrics::SESSIONS_ACTIVE.set(live as i64);
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new("test-secret-key-32-bytes-long!!!")
    }

    #[tokio::test]
    async fn issued_token_resolves_to_user() {
        let sessions = manager();
        let user = User::new("alice", "digest");

        let token = sessions.issue(&user).await.unwrap();
        let session = sessions.resolve(&token).await.expect("session is live");

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.username, "alice");
        assert!(token.starts_with(&session.session_id));
    }

    #[tokio::test]
    async fn each_login_gets_its_own_session() {
        let sessions = manager();
        let user = User::new("alice", "digest");

        let first = sessions.issue(&user).await.unwrap();
        let second = sessions.issue(&user).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn destroyed_token_no_longer_resolves() {
        let sessions = manager();
        let token = sessions.issue(&User::new("alice", "digest")).await.unwrap();

        sessions.destroy(&token).await;
        assert!(sessions.resolve(&token).await.is_none());
        assert!(sessions.is_empty().await);

        // idempotent
        sessions.destroy(&token).await;
        sessions.destroy("garbage").await;
    }

    #[tokio::test]
    async fn never_issued_tokens_do_not_resolve() {
        let sessions = manager();
        assert!(sessions.resolve("").await.is_none());
        assert!(sessions.resolve("no-dot-here").await.is_none());
        assert!(sessions.resolve("abc.def").await.is_none());
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let sessions = manager();
        let token = sessions.issue(&User::new("alice", "digest")).await.unwrap();

        let (id, _) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", id, URL_SAFE_NO_PAD.encode([0u8; 32]));
        assert!(sessions.resolve(&forged).await.is_none());
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let ours = manager();
        let theirs = SessionManager::new("another-secret-key-32-bytes-long");

        let token = theirs.issue(&User::new("mallory", "digest")).await.unwrap();
        assert!(ours.resolve(&token).await.is_none());
    }
}
