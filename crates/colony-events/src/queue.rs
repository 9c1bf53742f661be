//! The bounded, priority-sorted escalation queue.
//!
//! The queue is what the external supervisor consumes. It is kept in
//! descending priority order: each insert lands after every entry of equal
//! or higher priority, so equal priorities keep arrival order, and anything
//! past the capacity is dropped from the tail.

use std::path::Path;

use colony_types::EventRecord;

use crate::error::EventsError;

/// Default maximum number of queued events.
pub const MAX_QUEUED: usize = 10;

/// Bounded queue of events awaiting the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationQueue {
    /// Queued events, highest priority first.
    events: Vec<EventRecord>,
    /// Maximum length.
    capacity: usize,
}

impl Default for EscalationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationQueue {
    /// An empty queue holding at most [`MAX_QUEUED`] events.
    pub const fn new() -> Self {
        Self::with_capacity(MAX_QUEUED)
    }

    /// An empty queue holding at most `capacity` events.
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
        }
    }

    /// Insert `record` after every entry of equal or higher priority, then
    /// trim. Returns `false` if the record itself fell off the tail.
    pub fn push(&mut self, record: EventRecord) -> bool {
        let at = self
            .events
            .partition_point(|e| e.priority >= record.priority);
        self.events.insert(at, record);
        self.events.truncate(self.capacity);
        at < self.capacity
    }

    /// Queued events, highest priority first.
    pub fn entries(&self) -> &[EventRecord] {
        &self.events
    }

    /// Remove and return every queued event.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of queued events.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Serialize the queue as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    /// Merge a JSON event array into the queue in priority order, trimming.
    pub fn merge_json(&mut self, json: &str) -> Result<(), EventsError> {
        let events: Vec<EventRecord> = serde_json::from_str(json)?;
        for event in events {
            self.push(event);
        }
        Ok(())
    }

    /// Write the queue to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), EventsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Merge the events stored at `path`. A missing file is not an error.
    pub fn load(&mut self, path: &Path) -> Result<(), EventsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => self.merge_json(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
