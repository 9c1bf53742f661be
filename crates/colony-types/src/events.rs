//! The record type carried through the escalation queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EventType;

/// A notable condition detected during one tick.
///
/// This is the unit the external supervisor consumes, serialized as one
/// element of the pending-events array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRecord {
    /// Event classification.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Optional detail, e.g. `harvester:harvester1200` or a level number.
    pub value: Option<String>,
    /// Urgency; higher is more urgent.
    pub priority: u8,
    /// Host tick the condition was detected on.
    pub tick: u64,
    /// Wall-clock time the record was created.
    pub timestamp: DateTime<Utc>,
    /// Human-readable diagnostic line, as written to the console.
    pub raw: String,
}
