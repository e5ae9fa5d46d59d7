//! Common test utilities for E2E tests

#![allow(dead_code)]

use dashgate::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Test configuration backed by a SQLite file under `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
        },
        database: config::DatabaseConfig {
            backend: config::StoreBackend::Sqlite,
            path: temp_dir.path().join("test.db"),
        },
        storage: config::StorageConfig { timeout_ms: 5000 },
        auth: config::AuthConfig {
            session_secret: SESSION_SECRET.to_string(),
            cookie_name: "session".to_string(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        dashgate::metrics::init_metrics();
        let state = AppState::new(config).await.unwrap();

        // Redirects are asserted on, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = dashgate::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST a username/password form
    pub async fn post_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("request succeeds")
    }

    /// GET with an optional `Cookie` header
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }
        request.send().await.expect("request succeeds")
    }

    /// Register and log in, returning the `name=value` session cookie
    pub async fn login_as(&self, username: &str, password: &str) -> String {
        let response = self.post_credentials("/register", username, password).await;
        assert!(response.status().is_redirection());

        let response = self.post_credentials("/login", username, password).await;
        assert_eq!(location(&response), "/dashboard");
        session_cookie(&response).expect("login sets a session cookie")
    }
}

/// `Location` header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

/// `session=<token>` pair from the first session `Set-Cookie` header
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string)
}
