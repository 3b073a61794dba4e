//! Debounce for raw editor notifications.
//!
//! Editors fire many selection events per keystroke. Every notification
//! restarts one timer; only the settled state is evaluated, carrying the
//! `is_write` flag of the notification that restarted the timer last.

use chrono::{DateTime, Duration, Utc};

pub const DEBOUNCE_MS: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Selection,
    FocusChange,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTick {
    due_at: DateTime<Utc>,
    is_write: bool,
    kind: NotifyKind,
}

#[derive(Debug, Clone)]
pub struct EventCoalescer {
    delay: Duration,
    pending: Option<PendingTick>,
}

impl Default for EventCoalescer {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEBOUNCE_MS))
    }
}

impl EventCoalescer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Restarts the timer. Any earlier pending tick is replaced.
    pub fn notify(&mut self, kind: NotifyKind, is_write: bool, now: DateTime<Utc>) {
        self.pending = Some(PendingTick {
            due_at: now + self.delay,
            is_write,
            kind,
        });
    }

    /// When the pending tick fires, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.map(|tick| tick.due_at)
    }

    /// Returns the `is_write` flag of a tick whose timer has expired, consuming it.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<bool> {
        match self.pending {
            Some(tick) if tick.due_at <= now => {
                self.pending = None;
                tracing::trace!(kind = ?tick.kind, is_write = tick.is_write, "Debounce fired");
                Some(tick.is_write)
            }
            _ => None,
        }
    }

    /// Fires the pending tick immediately (host shutdown).
    pub fn flush(&mut self) -> Option<bool> {
        self.pending.take().map(|tick| tick.is_write)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(ms)
    }

    #[test]
    fn burst_fires_once_with_last_write_flag() {
        let mut coalescer = EventCoalescer::default();
        coalescer.notify(NotifyKind::Save, true, at(0));
        coalescer.notify(NotifyKind::Selection, false, at(10));
        coalescer.notify(NotifyKind::Selection, false, at(20));

        // 50ms after the first notification the timer has been restarted.
        assert_eq!(coalescer.take_due(at(50)), None);
        assert_eq!(coalescer.take_due(at(70)), Some(false));
        assert_eq!(coalescer.take_due(at(500)), None);
    }

    #[test]
    fn last_notification_write_flag_wins() {
        let mut coalescer = EventCoalescer::default();
        coalescer.notify(NotifyKind::Selection, false, at(0));
        coalescer.notify(NotifyKind::Save, true, at(30));
        assert_eq!(coalescer.deadline(), Some(at(80)));
        assert_eq!(coalescer.take_due(at(80)), Some(true));
    }

    #[test]
    fn flush_and_cancel() {
        let mut coalescer = EventCoalescer::default();
        coalescer.notify(NotifyKind::FocusChange, false, at(0));
        assert_eq!(coalescer.flush(), Some(false));
        assert_eq!(coalescer.deadline(), None);

        coalescer.notify(NotifyKind::Save, true, at(0));
        coalescer.cancel();
        assert_eq!(coalescer.take_due(at(1_000)), None);
    }
}
