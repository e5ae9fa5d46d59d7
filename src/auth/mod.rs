//! Credential authentication
//!
//! Handles:
//! - Password hashing
//! - Session management and transport
//! - Access control for protected routes

mod cookie;
pub mod gate;
mod middleware;
mod password;
pub mod session;

pub use cookie::SessionCookie;
pub use gate::{Access, authorize};
pub use middleware::{Authenticated, require_session};
pub use password::PasswordHasher;
pub use session::{Session, SessionManager};
