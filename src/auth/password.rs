//! Password hashing
//!
//! Argon2id digests in PHC string format. The salt and cost parameters
//! travel inside the digest, so verification needs nothing but the string.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use rand::rngs::OsRng;

use crate::error::AppError;

/// One-way salted hash + verify primitive
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordHasher {
    /// Build a hasher with explicit Argon2id cost parameters
    ///
    /// # Errors
    /// Returns `AppError::Config` if the parameters are out of range
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AppError::Config(format!("invalid argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| AppError::Hashing(e.to_string()))
    }

    /// Check a plaintext password against a stored digest
    ///
    /// The final output comparison is constant-time. A digest that cannot be
    /// parsed never verifies.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!(%error, "Stored password digest is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_async(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AppError::Hashing(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_async(&self, plaintext: String, digest: String) -> Result<bool, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|e| AppError::Hashing(e.to_string()))
    }
}
