//! Duplicate suppression for save-triggered heartbeats.
//!
//! A write is a duplicate when the previous record for the same file is OLDER
//! than the window and the cursor has not moved. Recent repeats are not
//! suppressed. Every check overwrites the file's record, duplicate or not.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

pub const DEDUPE_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeRecord {
    pub line: u32,
    pub column: u32,
    pub last_heartbeat_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct DuplicateSuppressor {
    records: HashMap<String, DedupeRecord>,
}

impl DuplicateSuppressor {
    pub fn is_duplicate(&mut self, entity: &str, now: DateTime<Utc>, line: u32, column: u32) -> bool {
        let window = Duration::minutes(DEDUPE_WINDOW_MINUTES);
        let duplicate = self.records.get(entity).is_some_and(|record| {
            record.last_heartbeat_at + window < now
                && record.line == line
                && record.column == column
        });

        self.records.insert(
            entity.to_string(),
            DedupeRecord {
                line,
                column,
                last_heartbeat_at: now,
            },
        );

        duplicate
    }

    pub fn record(&self, entity: &str) -> Option<&DedupeRecord> {
        self.records.get(entity)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
