//! Account service
//!
//! Register, login and logout flows. Each flow runs
//! lookup -> hash/verify -> store/issue, stopping at the first failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{PasswordHasher, Session, SessionManager};
use crate::data::{CredentialStore, User};
use crate::error::AppError;
use crate::metrics::{LOGINS_TOTAL, REGISTRATIONS_TOTAL, USERS_TOTAL};

/// Account service
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<SessionManager>,
    hasher: PasswordHasher,
    timeout: Duration,
}

impl AccountService {
    /// Create new account service
    ///
    /// # Arguments
    /// * `timeout` - upper bound for each credential store call
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<SessionManager>,
        hasher: PasswordHasher,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
            timeout,
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.timeout, call).await?
    }

    /// Create a new account
    ///
    /// Does not log the user in.
    ///
    /// # Errors
    /// - `Validation` for an empty username or password
    /// - `DuplicateUser` if the username is taken (including a lost race)
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username cannot be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }

        // Fast-path guard before expensive hashing.
        if self
            .bounded(self.store.find_by_username(username))
            .await?
            .is_some()
        {
            tracing::info!(username = %username, "Registration rejected: username taken");
            return Err(AppError::DuplicateUser);
        }

        let digest = self.hasher.hash_async(password.to_string()).await?;
        let user = self.bounded(self.store.create(username, &digest)).await?;

        REGISTRATIONS_TOTAL.inc();
        USERS_TOTAL.inc();
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Check credentials and issue a session
    ///
    /// `previous` is the token the client already presented, if any. It is
    /// destroyed once the password verifies so a client holds one live session.
    ///
    /// # Returns
    /// The signed session token and the session it refers to
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown username
    /// - `InvalidCredentials` for a wrong password
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        previous: Option<&str>,
    ) -> Result<(String, Session), AppError> {
        let Some(user) = self.bounded(self.store.find_by_username(username)).await? else {
            LOGINS_TOTAL.with_label_values(&["user_not_found"]).inc();
            tracing::info!(username = %username, "Login failed: user not found");
            return Err(AppError::UserNotFound);
        };

        let matches = self
            .hasher
            .verify_async(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            LOGINS_TOTAL.with_label_values(&["invalid_credentials"]).inc();
            tracing::info!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AppError::InvalidCredentials);
        }

        if let Some(previous) = previous {
            self.sessions.destroy(previous).await;
        }

        let token = self.sessions.issue(&user).await?;
        let session = self
            .sessions
            .resolve(&token)
            .await
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("issued session vanished")))?;

        LOGINS_TOTAL.with_label_values(&["success"]).inc();
        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok((token, session))
    }

    /// End the session behind `token`, if any
    pub async fn logout(&self, token: Option<&str>) {
        let Some(token) = token else {
            return;
        };

        if let Some(session) = self.sessions.resolve(token).await {
            tracing::info!(user_id = %session.user_id, "User logged out");
        }
        self.sessions.destroy(token).await;
    }
}
