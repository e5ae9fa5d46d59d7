//! SQLite database operations
//!
//! All durable credential access goes through this module.
//! Uses SQLx with embedded migrations.

use axum::async_trait;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Instant;

use super::models::User;
use super::store::CredentialStore;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }
}

fn observe(operation: &str, started: Instant) {
    use crate::metrics::{DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS};
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, "users"])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, "users"])
        .observe(started.elapsed().as_secs_f64());
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let started = Instant::now();
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        observe("select", started);

        Ok(user)
    }

    /// Insert a user, relying on the UNIQUE index for atomic duplicate detection
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let started = Instant::now();
        let user = User::new(username, password_hash);

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;
        observe("insert", started);

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(AppError::DuplicateUser)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn count(&self) -> Result<i64, AppError> {
        let started = Instant::now();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        observe("count", started);

        Ok(count)
    }

    /// Close the pool, waiting for in-flight queries
    async fn close(&self) {
        self.pool.close().await;
    }
}
