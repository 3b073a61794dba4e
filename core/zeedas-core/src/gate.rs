//! Heartbeat gate and the session state it compares against.

use chrono::{DateTime, Duration, Utc};

pub const HEARTBEAT_INTERVAL_MS: i64 = 120_000;

/// Process-wide session state, owned by the engine.
///
/// `last_*` fields only move when a heartbeat is actually dispatched.
/// `is_debugging` / `is_compiling` follow the editor's debug and task lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub last_file: Option<String>,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub last_debug: bool,
    pub last_compile: bool,
    pub is_debugging: bool,
    pub is_compiling: bool,
}

impl SessionState {
    /// True when a tick for `entity` at `now` warrants a heartbeat.
    pub fn should_emit(&self, entity: &str, now: DateTime<Utc>, is_write: bool) -> bool {
        is_write
            || self.enough_time_passed(now)
            || self.last_file.as_deref() != Some(entity)
            || self.last_debug != self.is_debugging
            || self.last_compile != self.is_compiling
    }

    fn enough_time_passed(&self, now: DateTime<Utc>) -> bool {
        match self.last_heartbeat_at {
            Some(last) => now - last > Duration::milliseconds(HEARTBEAT_INTERVAL_MS),
            None => true,
        }
    }

    /// Records a dispatched heartbeat.
    pub fn record_dispatch(&mut self, entity: &str, at: DateTime<Utc>) {
        self.last_file = Some(entity.to_string());
        self.last_heartbeat_at = Some(at);
        self.last_debug = self.is_debugging;
        self.last_compile = self.is_compiling;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(ms)
    }

    fn settled(entity: &str, last_ms: i64) -> SessionState {
        let mut state = SessionState::default();
        state.record_dispatch(entity, at(last_ms));
        state
    }

    #[test]
    fn fresh_session_always_emits() {
        let state = SessionState::default();
        assert!(state.should_emit("/p/a.go", at(0), false));
    }

    #[test]
    fn quiet_when_nothing_changed() {
        let state = settled("/p/a.go", 1_000_000);
        for offset in [0, 1, 60_000, HEARTBEAT_INTERVAL_MS] {
            assert!(
                !state.should_emit("/p/a.go", at(1_000_000 + offset), false),
                "offset {} should not emit",
                offset
            );
        }
    }

    #[test]
    fn emits_after_interval() {
        let state = settled("/p/a.go", 1_000_000);
        assert!(state.should_emit("/p/a.go", at(1_000_000 + HEARTBEAT_INTERVAL_MS + 1), false));
    }

    #[test]
    fn emits_on_write_or_file_change() {
        let state = settled("/p/a.go", 1_000_000);
        assert!(state.should_emit("/p/a.go", at(1_000_001), true));
        assert!(state.should_emit("/p/b.go", at(1_000_001), false));
    }

    #[test]
    fn emits_on_debug_or_build_flip() {
        let mut state = settled("/p/a.go", 1_000_000);
        state.is_debugging = true;
        assert!(state.should_emit("/p/a.go", at(1_000_001), false));

        state.record_dispatch("/p/a.go", at(1_000_001));
        assert!(!state.should_emit("/p/a.go", at(1_000_002), false));

        state.is_compiling = true;
        assert!(state.should_emit("/p/a.go", at(1_000_002), false));
    }
}
