use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Entries beyond this are evicted oldest-first, in the same call that
/// inserted the newest one.
pub const ACTIVITY_LOG_CAP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Success,
    Error,
}

/// One user-visible outcome, immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub message: String,
    pub kind: EntryKind,
    pub timestamp: DateTime<Local>,
}

/// Bounded, newest-first log of operation outcomes. Lives for exactly one
/// session: cleared on logout, repopulated as the next session acts.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    /// Prepends an entry stamped with the current wall-clock time and
    /// enforces the capacity immediately.
    pub fn record(&mut self, message: impl Into<String>, kind: EntryKind) -> ActivityEntry {
        let entry = ActivityEntry {
            message: message.into(),
            kind,
            timestamp: Local::now(),
        };
        self.entries.push_front(entry.clone());
        self.entries.truncate(ACTIVITY_LOG_CAP);
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first iteration for rendering.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }
}
