//! Authentication middleware
//!
//! Protects routes that require a session. Denials become
//! [`AppError::Unauthorized`], which renders as a redirect to the login page.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::gate::{Access, authorize};
use super::session::Session;
use crate::AppState;
use crate::error::AppError;

async fn check(headers: &axum::http::HeaderMap, state: &AppState) -> Access {
    let jar = CookieJar::from_headers(headers);
    let token = state.cookie.read(&jar);
    authorize(&state.sessions, token.as_deref()).await
}

/// Middleware to require a session
///
/// Adds the resolved `Session` to request extensions.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/metrics", ...)
///     .layer(middleware::from_fn_with_state(state, require_session));
/// ```
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match check(request.headers(), &state).await {
        Access::Allow(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Access::Deny => AppError::Unauthorized.into_response(),
    }
}

/// Extractor for the current authenticated session
///
/// # Usage
/// ```ignore
/// async fn handler(Authenticated(session): Authenticated) -> impl IntoResponse {
///     format!("Hello, {}", session.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>().cloned() {
            return Ok(Authenticated(session));
        }

        let state = AppState::from_ref(state);
        match check(&parts.headers, &state).await {
            Access::Allow(session) => {
                parts.extensions.insert(session.clone());
                Ok(Authenticated(session))
            }
            Access::Deny => {
                tracing::debug!(path = %parts.uri.path(), "No valid session; redirecting to login");
                Err(AppError::Unauthorized)
            }
        }
    }
}
