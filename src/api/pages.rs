//! Page routes
//!
//! One request -> response function per route; no business logic here
//! beyond picking the page to show.

use axum::{Form, Router, extract::State, routing::get};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::Deserialize;

use super::views::{Page, View};
use crate::AppState;
use crate::auth::Authenticated;
use crate::error::AppError;

/// Create page router
///
/// Routes:
/// - GET /            - Redirect to login
/// - GET/POST /register
/// - GET/POST /login
/// - GET /dashboard   - Protected
/// - GET /logout
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/dashboard", get(dashboard))
        .route("/logout", get(logout))
}

/// Submitted username/password pair
#[derive(Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
}

/// Form body whose parse failures surface as [`AppError::Validation`]
type Credentials = WithRejection<Form<CredentialsForm>, AppError>;

async fn index() -> Page {
    Page::Redirect("/login")
}

// =============================================================================
// Registration
// =============================================================================

/// GET /register
async fn register_form() -> Page {
    Page::Render(View::RegisterForm)
}

/// POST /register
///
/// Registration never logs the user in; success sends them to the login page.
async fn register(
    State(state): State<AppState>,
    WithRejection(Form(form), _): Credentials,
) -> Result<Page, AppError> {
    state.accounts.register(&form.username, &form.password).await?;
    Ok(Page::Redirect("/login"))
}

// =============================================================================
// Login / Logout
// =============================================================================

/// GET /login
async fn login_form() -> Page {
    Page::Render(View::LoginForm)
}

/// POST /login
///
/// On success replaces any session the client already held, sets the
/// session cookie and redirects to the dashboard.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(form), _): Credentials,
) -> Result<(CookieJar, Page), AppError> {
    let previous = state.cookie.read(&jar);
    let (token, _session) = state
        .accounts
        .login(&form.username, &form.password, previous.as_deref())
        .await?;
    Ok((state.cookie.set(jar, token), Page::Redirect("/dashboard")))
}

/// GET /logout
///
/// Destroys the session (if any) and clears the cookie.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Page) {
    let token = state.cookie.read(&jar);
    state.accounts.logout(token.as_deref()).await;
    (state.cookie.clear(jar), Page::Redirect("/login"))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET /dashboard
async fn dashboard(Authenticated(session): Authenticated) -> Page {
    Page::Render(View::Dashboard {
        username: session.username,
    })
}
