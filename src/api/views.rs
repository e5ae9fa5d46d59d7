//! Presentation
//!
//! Handlers return a [`Page`] instruction; this module is the only place
//! that turns one into HTML or a redirect.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use html_escape::encode_text;

/// Views the handlers can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    RegisterForm,
    LoginForm,
    Dashboard { username: String },
}

/// What a handler wants the presentation layer to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Render a full page
    Render(View),
    /// Send the browser elsewhere
    Redirect(&'static str),
    /// Plain user-facing text, optionally with a follow-up link
    Message {
        text: String,
        link: Option<(&'static str, &'static str)>,
    },
    /// Failure with a status code; the message is already safe to show
    Error { status: StatusCode, message: String },
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title} - Dashgate</title></head>
<body>
{body}
</body>
</html>
"#,
        title = encode_text(title),
    )
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
    <label>Username <input type="text" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">{submit}</button>
</form>"#
    )
}

/// Render a view to HTML
pub fn render(view: &View) -> String {
    match view {
        View::RegisterForm => layout(
            "Register",
            &format!(
                "<h1>Register</h1>\n{}\n<p>Already registered? <a href=\"/login\">Log in</a></p>",
                credentials_form("/register", "Register")
            ),
        ),
        View::LoginForm => layout(
            "Login",
            &format!(
                "<h1>Login</h1>\n{}\n<p>No account? <a href=\"/register\">Register</a></p>",
                credentials_form("/login", "Log in")
            ),
        ),
        View::Dashboard { username } => layout(
            "Dashboard",
            &format!(
                "<h1>Dashboard</h1>\n<p>Welcome, {}!</p>\n<p><a href=\"/logout\">Log out</a></p>",
                encode_text(username)
            ),
        ),
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Render(view) => Html(render(&view)).into_response(),
            Page::Redirect(path) => Redirect::to(path).into_response(),
            Page::Message { text, link } => {
                let mut body = encode_text(&text).into_owned();
                if let Some((href, label)) = link {
                    body.push_str(&format!(" <a href='{}'>{}</a>", href, encode_text(label)));
                }
                Html(body).into_response()
            }
            Page::Error { status, message } => {
                (status, Html(encode_text(&message).into_owned())).into_response()
            }
        }
    }
}
