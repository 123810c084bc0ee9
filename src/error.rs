use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of an external check (geolocation lookup, Transmission RPC).
///
/// Never fatal: the monitor that sees one publishes the worst-case value
/// and tries again on its next tick.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to run remote command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("remote command produced no output (exit {code:?}): {stderr}")]
    EmptyOutput { code: Option<i32>, stderr: String },

    #[error("lookup service answered with status '{0}'")]
    LookupRejected(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc answered with http status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("rpc session negotiation failed: no session id in 409 response")]
    MissingSessionId,

    #[error("rpc answered with result '{0}'")]
    RpcRejected(String),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("check timed out after {0:?}")]
    Timeout(Duration),
}

/// Invalid or unreadable configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration is not well formed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("invalid '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("output line '{0}' is assigned to more than one indicator")]
    SharedOutputLine(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A physical (or simulated) output line refused a write.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("gpio {pin}: failed to write '{}': {source}", path.display())]
    Write {
        pin: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
