//! Core domain types: documents, heartbeats, presence and summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeedas_protocol::EditorDocument;

/// URI scheme used by remote development windows.
pub const REMOTE_URI_SCHEME: &str = "vscode-remote";
/// URI scheme used by pull-request review documents.
pub const PULL_REQUEST_URI_SCHEME: &str = "pr";

/// Document in the focused editor, as reported by the editor glue.
pub type Document = EditorDocument;

/// Identifier a document is reported under.
///
/// Remote documents become `{authority}{path}` with `ssh-remote+` rewritten to
/// `ssh://`; everything else is the plain file name.
pub fn entity_for(document: &Document) -> String {
    if document.uri_scheme.as_deref() == Some(REMOTE_URI_SCHEME) {
        let authority = document.uri_authority.as_deref().unwrap_or_default();
        let path = document.uri_path.as_deref().unwrap_or_default();
        return format!("{}{}", authority, path).replacen("ssh-remote+", "ssh://", 1);
    }
    document.file_name.clone()
}

pub fn is_pull_request(document: &Document) -> bool {
    document.uri_scheme.as_deref() == Some(PULL_REQUEST_URI_SCHEME)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Heartbeats
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    None,
    Debugging,
    Building,
    CodeReviewing,
}

impl Category {
    /// Debugging wins over building, building over code review.
    pub fn derive(is_debugging: bool, is_compiling: bool, is_reviewing: bool) -> Self {
        if is_debugging {
            Self::Debugging
        } else if is_compiling {
            Self::Building
        } else if is_reviewing {
            Self::CodeReviewing
        } else {
            Self::None
        }
    }

    /// Wire name, or `None` when no category is sent.
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Debugging => Some("debugging"),
            Self::Building => Some("building"),
            Self::CodeReviewing => Some("code reviewing"),
        }
    }
}

/// One reported activity sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub entity: String,
    pub timestamp: DateTime<Utc>,
    /// 1-based.
    pub lineno: u32,
    /// 1-based.
    pub cursorpos: u32,
    pub lines_in_file: u32,
    pub is_write: bool,
    pub category: Category,
    pub is_unsaved: bool,
    pub project: Option<String>,
    pub project_folder: Option<String>,
    pub language: Option<String>,
}

impl Heartbeat {
    pub fn from_document(
        document: &Document,
        timestamp: DateTime<Utc>,
        is_write: bool,
        is_debugging: bool,
        is_compiling: bool,
    ) -> Self {
        Self {
            entity: entity_for(document),
            timestamp,
            lineno: document.cursor_line.saturating_add(1),
            cursorpos: document.cursor_character.saturating_add(1),
            lines_in_file: document.line_count,
            is_write,
            category: Category::derive(is_debugging, is_compiling, is_pull_request(document)),
            is_unsaved: document.is_untitled,
            project: non_empty(&document.project_name),
            project_folder: non_empty(&document.project_folder),
            language: non_empty(&document.language_id),
        }
    }

    /// Timestamp as fractional seconds since the epoch.
    pub fn epoch_secs(&self) -> f64 {
        self.timestamp.timestamp_millis() as f64 / 1000.0
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════════════

/// Today's coding activity, normalised across transports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    /// Human-readable total, `None` while the backend is still calculating.
    pub text: Option<String>,
    /// `None` when the backend sent nothing to read the flag from.
    pub has_team_features: Option<bool>,
}

/// Context sent with a file-experts query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRequest {
    pub entity: String,
    pub project: Option<String>,
    pub project_folder: Option<String>,
    pub is_unsaved: bool,
}

impl PresenceRequest {
    pub fn from_document(document: &Document) -> Self {
        Self {
            entity: entity_for(document),
            project: non_empty(&document.project_name),
            project_folder: non_empty(&document.project_folder),
            is_unsaved: document.is_untitled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceYou {
    pub total_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceOther {
    pub display_name: String,
    pub long_name: String,
    pub total_text: String,
}

/// Who has spent time in a file. Both sides empty means "fetched, no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub you: Option<PresenceYou>,
    pub other: Option<PresenceOther>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document {
            file_name: "/p/a.go".to_string(),
            cursor_line: 4,
            cursor_character: 2,
            line_count: 10,
            language_id: Some("go".to_string()),
            project_name: Some(" ".to_string()),
            ..Document::default()
        }
    }

    #[test]
    fn category_priority() {
        assert_eq!(Category::derive(true, true, true), Category::Debugging);
        assert_eq!(Category::derive(false, true, true), Category::Building);
        assert_eq!(Category::derive(false, false, true), Category::CodeReviewing);
        assert_eq!(Category::derive(false, false, false), Category::None);
        assert_eq!(Category::CodeReviewing.as_wire(), Some("code reviewing"));
    }

    #[test]
    fn heartbeat_positions_are_one_based() {
        let heartbeat =
            Heartbeat::from_document(&document(), DateTime::<Utc>::UNIX_EPOCH, true, false, false);
        assert_eq!(heartbeat.lineno, 5);
        assert_eq!(heartbeat.cursorpos, 3);
        assert_eq!(heartbeat.lines_in_file, 10);
        assert_eq!(heartbeat.project, None);
        assert_eq!(heartbeat.language.as_deref(), Some("go"));
    }

    #[test]
    fn remote_documents_use_authority_and_path() {
        let mut doc = document();
        doc.uri_scheme = Some(REMOTE_URI_SCHEME.to_string());
        doc.uri_authority = Some("ssh-remote+devbox".to_string());
        doc.uri_path = Some("/srv/app/main.go".to_string());
        assert_eq!(entity_for(&doc), "ssh://devbox/srv/app/main.go");
    }

    #[test]
    fn pull_request_documents_are_code_review() {
        let mut doc = document();
        doc.uri_scheme = Some(PULL_REQUEST_URI_SCHEME.to_string());
        let heartbeat =
            Heartbeat::from_document(&doc, DateTime::<Utc>::UNIX_EPOCH, false, false, false);
        assert_eq!(heartbeat.category, Category::CodeReviewing);
    }
}
