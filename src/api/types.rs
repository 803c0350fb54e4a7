//! API request and response types.

use serde::Serialize;

pub use crate::probe::DisplayRecord;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
