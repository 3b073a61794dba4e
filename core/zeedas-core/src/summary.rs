//! Throttled cache of today's coding activity.

use crate::types::TodaySummary;
use chrono::{DateTime, Duration, Utc};

pub const SUMMARY_THROTTLE_MS: i64 = 60_000;

#[derive(Debug, Clone, Default)]
pub struct SummaryCache {
    last_fetch_at: Option<DateTime<Utc>>,
    has_team_features: bool,
    text: Option<String>,
}

impl SummaryCache {
    /// Claims a fetch slot. The timestamp is taken before the fetch resolves,
    /// so overlapping refreshes collapse into one request.
    pub fn try_begin(&mut self, now: DateTime<Utc>) -> bool {
        let due = match self.last_fetch_at {
            Some(last) => now - last > Duration::milliseconds(SUMMARY_THROTTLE_MS),
            None => true,
        };
        if due {
            self.last_fetch_at = Some(now);
        }
        due
    }

    pub fn store(&mut self, summary: &TodaySummary) {
        if let Some(has_team_features) = summary.has_team_features {
            self.has_team_features = has_team_features;
        }
        self.text = summary.text.clone();
    }

    pub fn last_fetch_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetch_at
    }

    pub fn has_team_features(&self) -> bool {
        self.has_team_features
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn throttles_to_one_fetch_per_minute() {
        let mut cache = SummaryCache::default();
        assert!(cache.try_begin(at(0)));
        assert!(!cache.try_begin(at(10)));
        assert!(!cache.try_begin(at(60)));
        assert!(cache.try_begin(at(61)));
        assert_eq!(cache.last_fetch_at(), Some(at(61)));
    }

    #[test]
    fn refused_attempt_keeps_timestamp() {
        let mut cache = SummaryCache::default();
        cache.try_begin(at(0));
        cache.try_begin(at(30));
        assert_eq!(cache.last_fetch_at(), Some(at(0)));
    }

    #[test]
    fn store_and_clear() {
        let mut cache = SummaryCache::default();
        cache.try_begin(at(0));
        cache.store(&TodaySummary {
            text: Some("2 hrs".to_string()),
            has_team_features: Some(true),
        });
        assert_eq!(cache.text(), Some("2 hrs"));
        assert!(cache.has_team_features());

        cache.clear();
        assert_eq!(cache.text(), None);
        assert!(!cache.has_team_features());
        assert!(cache.try_begin(at(1)));
    }

    #[test]
    fn empty_summary_keeps_team_flag() {
        let mut cache = SummaryCache::default();
        cache.store(&TodaySummary {
            text: Some("2 hrs".to_string()),
            has_team_features: Some(true),
        });
        cache.store(&TodaySummary::default());
        assert!(cache.has_team_features());
        assert_eq!(cache.text(), None);

        cache.store(&TodaySummary {
            text: None,
            has_team_features: Some(false),
        });
        assert!(!cache.has_team_features());
    }
}
