//! API layer
//!
//! HTTP handlers for:
//! - Registration, login, logout and the dashboard
//! - Metrics (Prometheus)

pub mod metrics;
mod pages;
pub mod views;

pub use metrics::{metrics_router, track_http};
pub use pages::pages_router;
