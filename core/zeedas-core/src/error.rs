//! Error types for zeedas-core.
//!
//! `ZeedasError` covers setup failures (configuration files and HTTP client
//! construction). Per-attempt heartbeat and query failures are
//! [`TransportError`](crate::transport::TransportError) and never escape the
//! engine.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ZeedasError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Transport Setup Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Convenience type alias for Results using ZeedasError.
pub type Result<T> = std::result::Result<T, ZeedasError>;
