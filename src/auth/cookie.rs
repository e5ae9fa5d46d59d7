//! Session transport over a cookie

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AppConfig;

/// Associates a session token with the calling client
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.auth.cookie_name.clone(),
            config.should_use_secure_cookies(),
        )
    }

    /// Token presented by the client, if any
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Attach a freshly issued token
    pub fn set(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(
            Cookie::build((self.name.clone(), token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(self.secure),
        )
    }

    /// Tell the client to drop its token
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((self.name.clone(), "")).path("/"))
    }
}
