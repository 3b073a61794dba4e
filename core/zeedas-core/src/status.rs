//! What the editor should display.
//!
//! The engine keeps one [`StatusBoard`] and mutates it as heartbeats, summaries
//! and presence lookups resolve. Rendering is the host's business.

use crate::transport::TransportError;
use crate::types::{Presence, TodaySummary};
use serde::Serialize;

pub const ERROR_TEXT: &str = "Zeedas Error";
pub const OFFLINE_TOOLTIP: &str =
    "Zeedas: working offline... coding activity will sync next time we are online";
pub const CODING_TIME_TOOLTIP: &str = "Zeedas: Today's coding time. Click to visit dashboard.";
pub const CALCULATING_TOOLTIP: &str = "Zeedas: Calculating time spent today in background...";

/// Outcome of one heartbeat dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchStatus {
    Accepted,
    Offline,
    ConfigError { code: i32 },
    AuthError { code: i32 },
    Unknown { code: Option<i32> },
}

impl DispatchStatus {
    pub fn classify(result: &Result<(), TransportError>) -> Self {
        match result {
            Ok(()) => Self::Accepted,
            Err(TransportError::Offline { .. }) => Self::Offline,
            Err(TransportError::Config { code }) => Self::ConfigError { code: *code },
            Err(TransportError::Auth { code }) => Self::AuthError { code: *code },
            Err(TransportError::Unknown { code, .. }) => Self::Unknown { code: *code },
            Err(TransportError::Parse { .. } | TransportError::MissingContext(_)) => {
                Self::Unknown { code: None }
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::AuthError { .. } | Self::Unknown { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLabel {
    pub text: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBoard {
    pub visible: bool,
    pub text: Option<String>,
    pub tooltip: Option<String>,
    pub error: bool,
    pub last_dispatch: Option<DispatchStatus>,
    /// Set when the API key was rejected; the host should ask for a new one.
    pub credentials_prompt: bool,
    pub team_you: Option<TeamLabel>,
    pub team_other: Option<TeamLabel>,
}

impl StatusBoard {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    pub fn apply_dispatch(
        &mut self,
        status: DispatchStatus,
        show_coding_activity: bool,
        log_file: &str,
    ) {
        self.last_dispatch = Some(status);
        match status {
            DispatchStatus::Accepted => {
                self.error = false;
                self.credentials_prompt = false;
                if self.visible && !show_coding_activity {
                    self.text = None;
                }
            }
            DispatchStatus::Offline => {
                self.error = false;
                self.credentials_prompt = false;
                if self.visible {
                    if !show_coding_activity {
                        self.text = None;
                    }
                    self.tooltip = Some(OFFLINE_TOOLTIP.to_string());
                }
            }
            DispatchStatus::ConfigError { code } => self.set_error(format!(
                "Config parsing error ({}); Check your {} file for more details",
                code, log_file
            )),
            DispatchStatus::AuthError { code } => self.apply_auth_error(code),
            DispatchStatus::Unknown { code } => self.set_error(format!(
                "Unknown Error ({}); Check your {} file for more details",
                code.map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                log_file
            )),
        }
    }

    /// Shows a rejected API key. Leaves `last_dispatch` alone so summary
    /// fetches can report it too.
    pub fn apply_auth_error(&mut self, code: i32) {
        self.set_error(format!(
            "Invalid Api Key ({}); Make sure your Api Key is correct!",
            code
        ));
        self.credentials_prompt = true;
    }

    fn set_error(&mut self, message: String) {
        self.error = true;
        if self.visible {
            self.text = Some(ERROR_TEXT.to_string());
            self.tooltip = Some(format!("Zeedas: {}", message));
        }
    }

    pub fn apply_summary(&mut self, summary: &TodaySummary, show_coding_activity: bool) {
        self.error = false;
        self.credentials_prompt = false;
        match summary.text.as_deref() {
            Some(text) if show_coding_activity => {
                self.text = Some(text.to_string());
                self.tooltip = Some(CODING_TIME_TOOLTIP.to_string());
            }
            Some(text) => {
                self.text = None;
                self.tooltip = Some(text.to_string());
            }
            None => {
                self.text = None;
                self.tooltip = Some(CALCULATING_TOOLTIP.to_string());
            }
        }
    }

    pub fn apply_presence(&mut self, presence: &Presence) {
        self.team_you = presence.you.as_ref().map(|you| TeamLabel {
            text: format!("You: {}", you.total_text),
            tooltip: "Your total time spent in this file".to_string(),
        });
        self.team_other = presence.other.as_ref().map(|other| TeamLabel {
            text: format!("{}: {}", other.display_name, other.total_text),
            tooltip: format!("{}'s total time spent in this file", other.long_name),
        });
    }

    pub fn clear_team(&mut self) {
        self.team_you = None;
        self.team_other = None;
    }
}
