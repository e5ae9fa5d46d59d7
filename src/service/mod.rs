//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the credential store, password hasher and sessions.

mod account;

pub use account::AccountService;
