//! Operator audit log
//!
//! One timestamped line per byte sent, byte received, mode change and
//! connection change. Bounded; the oldest lines are dropped first.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::constants::DEFAULT_AUDIT_CAPACITY;
use crate::event_bus::LinkEvent;

/// One audit line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// When the line was recorded
    pub timestamp: DateTime<Local>,
    /// Line text without the timestamp
    pub message: String,
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S%.3f"), self.message)
    }
}

/// Time-ordered, bounded list of audit lines
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
}

impl AuditLog {
    /// Create a log keeping at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY)),
            capacity,
        }
    }

    /// Record an event stamped with the current local time
    pub fn record(&mut self, event: &LinkEvent) -> &AuditEntry {
        self.record_at(event, Local::now())
    }

    /// Record an event with an explicit timestamp
    pub fn record_at(&mut self, event: &LinkEvent, timestamp: DateTime<Local>) -> &AuditEntry {
        self.push(AuditEntry {
            timestamp,
            message: event.description(),
        })
    }

    fn push(&mut self, entry: AuditEntry) -> &AuditEntry {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Lines in recording order
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// Number of lines held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no lines are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every line
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
