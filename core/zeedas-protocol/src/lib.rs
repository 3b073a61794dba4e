//! Wire types for the Zeedas heartbeat engine.
//!
//! Two contracts live here so they cannot drift apart between crates:
//!
//! - the editor side: newline-delimited [`EditorMessage`] values the editor
//!   glue writes to `zeedas-hook run`;
//! - the backend side: JSON shapes produced by the activity CLI and the HTTP
//!   API (heartbeat payloads, today's summary, file experts).
//!
//! The engine remains the authority on semantics; these types only pin the
//! schema.

use serde::{Deserialize, Serialize};

pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Editor Messages
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum EditorEventType {
    SelectionChanged,
    ActiveEditorChanged,
    DocumentSaved,
    DebugSessionStarted,
    DebugSessionTerminated,
    DebugSessionChanged,
    TaskStarted,
    TaskEnded,
}

/// Snapshot of the document in the focused editor.
///
/// Cursor coordinates are zero-based, as editors report them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EditorDocument {
    pub file_name: String,
    #[serde(default)]
    pub uri_scheme: Option<String>,
    #[serde(default)]
    pub uri_authority: Option<String>,
    #[serde(default)]
    pub uri_path: Option<String>,
    #[serde(default)]
    pub cursor_line: u32,
    #[serde(default)]
    pub cursor_character: u32,
    #[serde(default)]
    pub line_count: u32,
    #[serde(default)]
    pub is_untitled: bool,
    #[serde(default)]
    pub language_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_folder: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskInfo {
    #[serde(default)]
    pub is_background: bool,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EditorMessage {
    pub event: EditorEventType,
    #[serde(default)]
    pub document: Option<EditorDocument>,
    #[serde(default)]
    pub task: Option<TaskInfo>,
}

impl EditorMessage {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        match self.event {
            EditorEventType::SelectionChanged | EditorEventType::DocumentSaved => {
                let document = self.document.as_ref().ok_or_else(|| {
                    ErrorInfo::new("missing_field", "document is required")
                })?;
                validate_document(document)?;
            }
            EditorEventType::ActiveEditorChanged => {
                // A missing document means no editor has focus.
                if let Some(document) = &self.document {
                    validate_document(document)?;
                }
            }
            EditorEventType::TaskStarted => {
                if self.task.is_none() {
                    return Err(ErrorInfo::new("missing_field", "task is required"));
                }
            }
            EditorEventType::DebugSessionStarted
            | EditorEventType::DebugSessionTerminated
            | EditorEventType::DebugSessionChanged
            | EditorEventType::TaskEnded => {}
        }
        Ok(())
    }
}

fn validate_document(document: &EditorDocument) -> Result<(), ErrorInfo> {
    if document.file_name.trim().is_empty() {
        return Err(ErrorInfo::new(
            "missing_field",
            "document.file_name is required",
        ));
    }
    Ok(())
}

pub fn parse_editor_message(line: &str) -> Result<EditorMessage, ErrorInfo> {
    if line.len() > MAX_MESSAGE_BYTES {
        return Err(ErrorInfo::new(
            "message_too_large",
            "editor message exceeded maximum size",
        ));
    }
    let message: EditorMessage = serde_json::from_str(line).map_err(|err| {
        ErrorInfo::new(
            "invalid_message",
            format!("editor message is invalid JSON: {}", err),
        )
    })?;
    message.validate()?;
    Ok(message)
}

// ═══════════════════════════════════════════════════════════════════════════════
// HTTP API Bodies
// ═══════════════════════════════════════════════════════════════════════════════

/// Body of `POST /users/current/heartbeats`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartbeatPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub entity: String,
    pub time: f64,
    pub plugin: String,
    pub lineno: u32,
    pub cursorpos: u32,
    pub lines: u32,
    pub is_write: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_unsaved_entity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root_count: Option<usize>,
}

/// Response of `GET /users/current/statusbar/today`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodayResponse {
    #[serde(default)]
    pub data: Option<TodayData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodayData {
    #[serde(default)]
    pub grand_total: Option<GrandTotal>,
    #[serde(default)]
    pub categories: Vec<CategoryTotal>,
    #[serde(default)]
    pub has_team_features: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrandTotal {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub text: String,
}

/// Body of `POST /users/current/file_experts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileExpertsRequest {
    pub entity: String,
    pub plugin: String,
    pub project: String,
    pub project_root_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileExpertsResponse {
    #[serde(default)]
    pub data: Option<Vec<FileExpert>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileExpert {
    #[serde(default)]
    pub user: Option<ExpertUser>,
    pub total: ExpertTotal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpertUser {
    #[serde(default)]
    pub is_current_user: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub long_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpertTotal {
    #[serde(default)]
    pub text: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLI JSON Output
// ═══════════════════════════════════════════════════════════════════════════════

/// Output of `--today --output json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliTodayOutput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub has_team_features: bool,
}

/// Output of `--output json --file-experts <entity>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliFileExpertsOutput {
    #[serde(default)]
    pub you: Option<FileExpert>,
    #[serde(default)]
    pub other: Option<FileExpert>,
}
