//! Per-file cache of who else spends time in a file.
//!
//! Entries live for the whole session. A stored entry with neither side set
//! means the backend had nothing; it is not fetched again.

use crate::types::Presence;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(Presence),
    /// Caller must fetch; the entity is now marked in flight.
    Fetch,
    /// A fetch for this entity is already running.
    InFlight,
}

#[derive(Debug, Default)]
pub struct PresenceCache {
    entries: HashMap<String, Presence>,
    pending: HashSet<String>,
    focused: Option<String>,
}

impl PresenceCache {
    /// Moves focus to `entity`. Returns true when focus actually changed.
    pub fn focus(&mut self, entity: &str) -> bool {
        if self.focused.as_deref() == Some(entity) {
            return false;
        }
        self.focused = Some(entity.to_string());
        true
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn lookup(&mut self, entity: &str) -> Lookup {
        if let Some(presence) = self.entries.get(entity) {
            return Lookup::Hit(presence.clone());
        }
        if !self.pending.insert(entity.to_string()) {
            return Lookup::InFlight;
        }
        Lookup::Fetch
    }

    /// Records a finished fetch. Returns the presence to display, which is
    /// only the case when `entity` still has focus.
    ///
    /// Failed fetches (`None`) are not cached and will be retried.
    pub fn resolve(&mut self, entity: &str, fetched: Option<Presence>) -> Option<Presence> {
        self.pending.remove(entity);
        let presence = fetched?;
        self.entries.insert(entity.to_string(), presence.clone());
        if self.focused.as_deref() == Some(entity) {
            Some(presence)
        } else {
            tracing::debug!(entity = %entity, "Dropping presence for unfocused file");
            None
        }
    }

    pub fn get(&self, entity: &str) -> Option<&Presence> {
        self.entries.get(entity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.focused = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresenceYou;

    fn presence(total: &str) -> Presence {
        Presence {
            you: Some(PresenceYou {
                total_text: total.to_string(),
            }),
            other: None,
        }
    }

    #[test]
    fn miss_then_hit() {
        let mut cache = PresenceCache::default();
        cache.focus("/p/a.go");
        assert_eq!(cache.lookup("/p/a.go"), Lookup::Fetch);
        assert_eq!(cache.lookup("/p/a.go"), Lookup::InFlight);

        assert_eq!(
            cache.resolve("/p/a.go", Some(presence("1 hr"))),
            Some(presence("1 hr"))
        );
        assert_eq!(cache.lookup("/p/a.go"), Lookup::Hit(presence("1 hr")));
    }

    #[test]
    fn stale_result_is_cached_but_not_shown() {
        let mut cache = PresenceCache::default();
        cache.focus("/p/a.go");
        assert_eq!(cache.lookup("/p/a.go"), Lookup::Fetch);
        cache.focus("/p/b.go");

        assert_eq!(cache.resolve("/p/a.go", Some(presence("1 hr"))), None);
        assert_eq!(cache.get("/p/a.go"), Some(&presence("1 hr")));
    }

    #[test]
    fn empty_result_is_not_refetched() {
        let mut cache = PresenceCache::default();
        cache.focus("/p/a.go");
        cache.lookup("/p/a.go");
        cache.resolve("/p/a.go", Some(Presence::default()));
        assert_eq!(cache.lookup("/p/a.go"), Lookup::Hit(Presence::default()));
    }

    #[test]
    fn failed_fetch_is_retried() {
        let mut cache = PresenceCache::default();
        cache.focus("/p/a.go");
        cache.lookup("/p/a.go");
        assert_eq!(cache.resolve("/p/a.go", None), None);
        assert_eq!(cache.lookup("/p/a.go"), Lookup::Fetch);
    }

    #[test]
    fn focus_reports_changes() {
        let mut cache = PresenceCache::default();
        assert!(cache.focus("/p/a.go"));
        assert!(!cache.focus("/p/a.go"));
        assert!(cache.focus("/p/b.go"));
        cache.clear();
        assert_eq!(cache.focused(), None);
    }
}
