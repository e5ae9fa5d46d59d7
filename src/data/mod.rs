//! Data layer module
//!
//! Handles user record persistence:
//! - SQLite database operations
//! - In-memory store (volatile)

mod database;
mod memory;
mod models;
mod store;

pub use database::Database;
pub use memory::MemoryStore;
pub use models::*;
pub use store::CredentialStore;

#[cfg(test)]
pub use store::MockCredentialStore;
