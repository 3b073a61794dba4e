//! Heartbeat transports.
//!
//! The engine only sees [`Transport`]. Two implementations exist:
//!
//! - [`CliTransport`]: runs the activity CLI as a subprocess and reads its
//!   exit code and JSON output.
//! - [`HttpTransport`]: talks to the activity API directly.
//!
//! Calls are blocking; the engine runs them off its own timeline through a
//! [`Spawner`](crate::spawner::Spawner).

mod cli;
mod http;

pub use cli::CliTransport;
pub use http::{count_path_separators, select_experts, HttpTransport};

use crate::config::{TransportKind, ZeedasConfig};
use crate::error::Result;
use crate::storage::StorageConfig;
use crate::types::{Heartbeat, Presence, PresenceRequest, TodaySummary};
use std::sync::Arc;

/// Exit codes of the activity CLI.
pub const EXIT_OK: i32 = 0;
pub const EXIT_API_ERROR: i32 = 102;
pub const EXIT_CONFIG_ERROR: i32 = 103;
pub const EXIT_AUTH_ERROR: i32 = 104;
pub const EXIT_BACKOFF: i32 = 112;

/// Failure of a single transport call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Rate limited, or queued locally until the backend is reachable.
    #[error("Working offline ({code})")]
    Offline { code: i32 },

    #[error("Config parsing error ({code})")]
    Config { code: i32 },

    #[error("Invalid Api Key ({code})")]
    Auth { code: i32 },

    #[error("Unknown Error ({}): {details}", code_label(.code))]
    Unknown { code: Option<i32>, details: String },

    #[error("Failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing project context for {0}")]
    MissingContext(String),
}

fn code_label(code: &Option<i32>) -> String {
    code.map(|code| code.to_string())
        .unwrap_or_else(|| "no code".to_string())
}

impl TransportError {
    pub fn unknown(code: Option<i32>, details: impl Into<String>) -> Self {
        Self::Unknown {
            code,
            details: details.into(),
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }
}

/// Maps a CLI exit status onto the transport outcome.
pub fn classify_exit_code(code: Option<i32>) -> std::result::Result<(), TransportError> {
    match code {
        Some(EXIT_OK) => Ok(()),
        Some(code @ (EXIT_API_ERROR | EXIT_BACKOFF)) => Err(TransportError::Offline { code }),
        Some(code @ EXIT_CONFIG_ERROR) => Err(TransportError::Config { code }),
        Some(code @ EXIT_AUTH_ERROR) => Err(TransportError::Auth { code }),
        other => Err(TransportError::unknown(other, "activity CLI failed")),
    }
}

/// Maps an HTTP status onto the transport outcome.
pub fn classify_http_status(
    status: u16,
    accepted: &[u16],
) -> std::result::Result<(), TransportError> {
    if accepted.contains(&status) {
        return Ok(());
    }
    match status {
        401 => Err(TransportError::Auth {
            code: i32::from(status),
        }),
        other => Err(TransportError::unknown(
            Some(i32::from(other)),
            "activity API rejected the request",
        )),
    }
}

/// Delivery mechanism for heartbeats and the summary queries.
pub trait Transport: Send + Sync {
    /// Short name for logs ("cli", "http").
    fn name(&self) -> &'static str;

    fn send_heartbeat(&self, heartbeat: &Heartbeat) -> std::result::Result<(), TransportError>;

    fn fetch_summary(&self) -> std::result::Result<TodaySummary, TransportError>;

    fn fetch_presence(
        &self,
        request: &PresenceRequest,
    ) -> std::result::Result<Presence, TransportError>;
}

/// Builds the transport selected in the config.
pub fn build_transport(
    config: &ZeedasConfig,
    storage: &StorageConfig,
) -> Result<Arc<dyn Transport>> {
    match config.settings.transport {
        TransportKind::Cli => Ok(Arc::new(CliTransport::from_config(config, storage))),
        TransportKind::Http => Ok(Arc::new(HttpTransport::from_config(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_taxonomy() {
        assert!(classify_exit_code(Some(0)).is_ok());
        assert!(matches!(
            classify_exit_code(Some(102)),
            Err(TransportError::Offline { code: 102 })
        ));
        assert!(matches!(
            classify_exit_code(Some(112)),
            Err(TransportError::Offline { code: 112 })
        ));
        assert!(matches!(
            classify_exit_code(Some(103)),
            Err(TransportError::Config { code: 103 })
        ));
        assert!(matches!(
            classify_exit_code(Some(104)),
            Err(TransportError::Auth { code: 104 })
        ));
        assert!(matches!(
            classify_exit_code(Some(1)),
            Err(TransportError::Unknown { code: Some(1), .. })
        ));
        assert!(matches!(
            classify_exit_code(None),
            Err(TransportError::Unknown { code: None, .. })
        ));
    }

    #[test]
    fn http_status_taxonomy() {
        let accepted = [200, 201, 202];
        for status in accepted {
            assert!(classify_http_status(status, &accepted).is_ok());
        }
        assert!(matches!(
            classify_http_status(401, &accepted),
            Err(TransportError::Auth { code: 401 })
        ));
        assert!(matches!(
            classify_http_status(500, &accepted),
            Err(TransportError::Unknown { code: Some(500), .. })
        ));
        assert!(classify_http_status(201, &[200]).is_err());
    }

    #[test]
    fn error_messages_carry_codes() {
        assert_eq!(
            TransportError::Auth { code: 104 }.to_string(),
            "Invalid Api Key (104)"
        );
        assert_eq!(
            TransportError::unknown(None, "spawn failed").to_string(),
            "Unknown Error (no code): spawn failed"
        );
    }

    #[test]
    fn build_transport_follows_config() {
        let storage = StorageConfig::with_root(std::path::PathBuf::from("/tmp/zeedas"));
        let mut config = ZeedasConfig::default();
        assert_eq!(build_transport(&config, &storage).unwrap().name(), "cli");
        config.settings.transport = TransportKind::Http;
        assert_eq!(build_transport(&config, &storage).unwrap().name(), "http");
    }
}
