//! Dashgate - a credential-based authentication gate for a single dashboard
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Register / login / logout / dashboard pages              │
//! │  - Metrics endpoint                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Service Layer + Auth                           │
//! │  - Account flows                                            │
//! │  - Password hashing, sessions, access gate                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx) or in-memory credential store              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and presentation
//! - `service`: Register/login/logout flows
//! - `auth`: Hashing, sessions, access control
//! - `data`: Credential store
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Built once at startup and cloned for each request.
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub store: Arc<dyn data::CredentialStore>,

    /// Live sessions
    pub sessions: Arc<auth::SessionManager>,

    /// Register/login/logout flows
    pub accounts: Arc<service::AccountService>,

    /// Session cookie transport
    pub cookie: auth::SessionCookie,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Open the configured credential store
    /// 2. Build the session manager from the configured secret
    /// 3. Wire the account service
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let store: Arc<dyn data::CredentialStore> = match config.database.backend {
            config::StoreBackend::Sqlite => {
                Arc::new(data::Database::connect(&config.database.path).await?)
            }
            config::StoreBackend::Memory => {
                tracing::warn!("Using in-memory credential store; users are lost on restart");
                Arc::new(data::MemoryStore::new())
            }
        };

        let users = store.count().await?;
        metrics::USERS_TOTAL.set(users);
        tracing::info!(users, "Credential store ready");

        Self::with_store(&config, store)
    }

    /// Build state around an already-open credential store
    pub fn with_store(
        config: &config::AppConfig,
        store: Arc<dyn data::CredentialStore>,
    ) -> Result<Self, error::AppError> {
        let hasher =
            auth::PasswordHasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)?;
        let sessions = Arc::new(auth::SessionManager::new(&config.auth.session_secret));
        let accounts = Arc::new(service::AccountService::new(
            Arc::clone(&store),
            Arc::clone(&sessions),
            hasher,
            config.storage.timeout(),
        ));
        let cookie = auth::SessionCookie::from_config(config);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            store,
            sessions,
            accounts,
            cookie,
        })
    }

    /// Release resources held by the credential store
    pub async fn shutdown(&self) {
        self.store.close().await;
        tracing::info!("Application state shut down");
    }
}

/// Upper bound for form bodies
const MAX_FORM_BYTES: usize = 16 * 1024;

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

    let protected = api::metrics_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_session,
    ));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::pages_router())
        .merge(protected)
        .route_layer(middleware::from_fn(api::track_http))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
