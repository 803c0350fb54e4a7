//! HTTP API for the secrets probe.
//!
//! ## Endpoints
//!
//! - `GET /` - Probe page (HTML)
//! - `GET /api/probe` - Probe result as JSON
//! - `GET /api/health` - Health check

mod pages;
mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
