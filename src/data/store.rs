//! Credential store abstraction
//!
//! Route handlers depend on this trait, not on a concrete backend.

use axum::async_trait;

use super::models::User;
use crate::error::AppError;

/// Durable registry of username -> password digest records
///
/// Implementations must make `create` atomic with respect to the uniqueness
/// check: of two concurrent `create` calls for the same username, exactly one
/// succeeds and the other returns [`AppError::DuplicateUser`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact-match lookup, no case normalization
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user record
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    /// Number of registered users
    async fn count(&self) -> Result<i64, AppError>;

    /// Release backend resources at shutdown
    async fn close(&self) {}
}
