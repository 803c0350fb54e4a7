//! Secret materialization probe.
//!
//! Resolves the two environment-injected secrets and the one file-mounted
//! secret into a [`DisplayRecord`]. Absence of any source is a normal outcome
//! and is represented by the [`SENTINEL`] value:
//!
//! ```text
//! env  sb-env-secret        ──► sb_connection
//! env  storage-env-secret   ──► storage_connection
//! file <web_root>/secrets/servicebus-key ──► mount_data
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let record = probe(&config.web_root).await?;
//! println!("{}", record.mount_data);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Value substituted for any secret that is not available.
pub const SENTINEL: &str = "NA";

/// Environment variable carrying the Service Bus connection secret.
pub const SB_ENV_VAR: &str = "sb-env-secret";

/// Environment variable carrying the storage connection secret.
pub const STORAGE_ENV_VAR: &str = "storage-env-secret";

/// Directory under the web root that the secret driver mounts into.
pub const SECRETS_DIR: &str = "secrets";

/// File name of the mounted Service Bus key.
pub const SECRET_FILE: &str = "servicebus-key";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to read secret file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three resolved values shown on the probe page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    /// Value of `storage-env-secret`, or `NA`.
    pub storage_connection: String,

    /// Value of `sb-env-secret`, or `NA`.
    pub sb_connection: String,

    /// `Secret found at (<path>): <contents>`
    pub mount_data: String,
}

/// Source of environment variables for the probe.
pub trait EnvSource: Send + Sync {
    /// Return the variable's value, or `None` when it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-unicode values are still "set".
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Look up `name` in `env`, falling back to `default` when unset.
pub fn lookup(env: &dyn EnvSource, name: &str, default: &str) -> String {
    env.var(name).unwrap_or_else(|| default.to_string())
}

/// Path of the mounted secret file for a given web root.
pub fn secret_file_path(web_root: &Path) -> PathBuf {
    web_root.join(SECRETS_DIR).join(SECRET_FILE)
}

/// Probe bound to a web root and an environment source.
pub struct SecretProbe<E = ProcessEnv> {
    web_root: PathBuf,
    env: E,
}

impl SecretProbe<ProcessEnv> {
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
            env: ProcessEnv,
        }
    }
}

impl<E: EnvSource> SecretProbe<E> {
    /// Swap the environment source, keeping the web root.
    pub fn with_env<F: EnvSource>(self, env: F) -> SecretProbe<F> {
        SecretProbe {
            web_root: self.web_root,
            env,
        }
    }

    /// Resolve all three secrets into a fresh [`DisplayRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Read`] only when the secret file exists but
    /// cannot be read. Unset variables and a missing file are not errors.
    pub async fn run(&self) -> Result<DisplayRecord, ProbeError> {
        let sb_connection = lookup(&self.env, SB_ENV_VAR, SENTINEL);
        let storage_connection = lookup(&self.env, STORAGE_ENV_VAR, SENTINEL);

        let path = secret_file_path(&self.web_root);
        let contents = read_secret_file(&path)
            .await?
            .unwrap_or_else(|| SENTINEL.to_string());

        tracing::debug!(
            sb_present = sb_connection != SENTINEL,
            storage_present = storage_connection != SENTINEL,
            file_present = contents != SENTINEL,
            path = %path.display(),
            "Probed secret sources"
        );

        Ok(DisplayRecord {
            storage_connection,
            sb_connection,
            mount_data: format!("Secret found at ({}): {}", path.display(), contents),
        })
    }
}

/// Probe the process environment and the secret mount under `web_root`.
pub async fn probe(web_root: &Path) -> Result<DisplayRecord, ProbeError> {
    SecretProbe::new(web_root).run().await
}

/// Read the file at `path` as text if it is a regular file.
///
/// Returns `Ok(None)` when nothing readable as a file is there.
async fn read_secret_file(path: &Path) -> Result<Option<String>, ProbeError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), "Secret file not accessible: {}", e);
            }
            return Ok(None);
        }
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| ProbeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(decode_text(&bytes)))
}

/// Decode file bytes as text, honouring a leading byte-order mark.
///
/// UTF-32 and UTF-16 (either byte order) are recognised by their BOM; anything
/// else is UTF-8. The BOM is dropped and malformed input is decoded lossily.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE, 0x00, 0x00]) {
        decode_utf32(rest, u32::from_le_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0x00, 0x00, 0xFE, 0xFF]) {
        decode_utf32(rest, u32::from_be_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        decode_utf16(rest, u16::from_le_bytes)
    } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        decode_utf16(rest, u16::from_be_bytes)
    } else {
        let rest = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        String::from_utf8_lossy(rest).into_owned()
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let mut units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    if bytes.len() % 2 != 0 {
        // Dangling byte: force a replacement character.
        units.push(0xD800);
    }
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    let mut out: String = bytes
        .chunks_exact(4)
        .map(|c| {
            char::from_u32(unit([c[0], c[1], c[2], c[3]])).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect();
    if bytes.len() % 4 != 0 {
        out.push(char::REPLACEMENT_CHARACTER);
    }
    out
}
