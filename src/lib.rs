//! # Secrets Probe
//!
//! Diagnostic web page for secret-injection mechanisms such as a CSI secret
//! store mount.
//!
//! On each request the probe reads:
//! - `sb-env-secret` and `storage-env-secret` from the process environment
//! - `<web_root>/secrets/servicebus-key` from the filesystem
//!
//! and renders the three values, substituting `NA` for anything absent.
//!
//! ## Modules
//! - `probe`: resolves the secrets into a `DisplayRecord`
//! - `api`: axum router serving the HTML page, JSON view and health check
//! - `config`: environment-driven server configuration

pub mod api;
pub mod config;
pub mod probe;
pub mod util;

pub use config::Config;
pub use probe::{probe, DisplayRecord, ProbeError, SecretProbe};
