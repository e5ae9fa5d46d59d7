//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf, time::Duration};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
    /// Public domain (e.g., "dash.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://dash.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Credential store backend selector
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Which credential store to use
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to SQLite database file (ignored by the memory backend)
    pub path: PathBuf,
}

/// Storage call policy
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Upper bound for a single credential store call, in milliseconds
    pub timeout_ms: u64,
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session signing secret (32+ bytes)
    pub session_secret: String,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Argon2id memory cost in KiB
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    /// Argon2id iteration count
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_hash_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_hash_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (DASHGATE__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.domain", "localhost")?
            .set_default("server.protocol", "http")?
            .set_default("database.backend", "sqlite")?
            .set_default("database.path", "data/dashgate.db")?
            .set_default("storage.timeout_ms", 5000)?
            .set_default("auth.cookie_name", "session")?
            .set_default("auth.hash_memory_kib", i64::from(default_hash_memory_kib()))?
            .set_default("auth.hash_iterations", i64::from(default_hash_iterations()))?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DASHGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    /// Non-fatal findings worth logging once tracing is up
    pub fn startup_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.should_use_secure_cookies() {
            warnings.push(format!(
                "Using insecure session cookies for local development (host {}, protocol {})",
                normalized_server_host(&self.server.domain),
                self.server.protocol
            ));
        }

        warnings
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.cookie_name.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.cookie_name must not be empty".to_string(),
            ));
        }

        crate::auth::PasswordHasher::new(self.auth.hash_memory_kib, self.auth.hash_iterations)?;

        if self.storage.timeout_ms == 0 {
            return Err(crate::error::AppError::Config(
                "storage.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.should_use_secure_cookies() && !self.server.protocol.eq_ignore_ascii_case("https")
        {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    // Url keeps the brackets around IPv6 literals
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

/// Local-development configuration with cheap hashing and an in-memory store
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            path: PathBuf::from("/tmp/dashgate-test.db"),
        },
        storage: StorageConfig { timeout_ms: 5000 },
        auth: AuthConfig {
            session_secret: "x".repeat(32),
            cookie_name: "session".to_string(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
