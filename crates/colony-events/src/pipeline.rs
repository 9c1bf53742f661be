//! Turning detections into records and records into queued escalations.
//!
//! The in-tick half ([`EscalationPipeline::record`]) stamps each detection
//! with its priority and console line. The consumer half
//! ([`EscalationPipeline::ingest`]) runs the wall-clock cooldown filter and
//! inserts survivors into the bounded queue.

use chrono::{DateTime, Utc};
use colony_types::EventRecord;
use tracing::{debug, info};

use crate::config::EventConfig;
use crate::cooldown::CooldownFilter;
use crate::detect::Detection;
use crate::priority::priority_for_payload;
use crate::queue::EscalationQueue;
use crate::wire::format_console_line;

/// What happened to an ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// The record is in the queue.
    Queued,
    /// The cooldown window for its type had not elapsed.
    Suppressed,
    /// It was inserted but fell off the tail.
    Dropped,
}

/// Cooldown filter plus escalation queue.
#[derive(Debug, Clone)]
pub struct EscalationPipeline {
    cooldown: CooldownFilter,
    queue: EscalationQueue,
}

impl EscalationPipeline {
    /// Build an empty pipeline from configuration.
    pub fn new(config: &EventConfig) -> Self {
        Self {
            cooldown: CooldownFilter::new(config),
            queue: EscalationQueue::with_capacity(config.queue_capacity),
        }
    }

    /// Stamp a detection with priority, tick, time, and console line.
    pub fn record(detection: Detection, tick: u64, now: DateTime<Utc>) -> EventRecord {
        let value = detection.value;
        let raw = format_console_line(detection.event_type, value.as_deref());
        EventRecord {
            event_type: detection.event_type,
            priority: priority_for_payload(detection.event_type, value.as_deref()),
            value,
            tick,
            timestamp: now,
            raw,
        }
    }

    /// Pass `record` through the cooldown filter and into the queue.
    pub fn ingest(&mut self, record: EventRecord) -> Ingested {
        if !self.cooldown.should_deliver(record.event_type, record.timestamp) {
            debug!(event = %record.event_type, "cooldown active, not escalating");
            return Ingested::Suppressed;
        }
        let event = record.event_type;
        let priority = record.priority;
        if self.queue.push(record) {
            info!(%event, priority, queued = self.queue.len(), "event escalated");
            Ingested::Queued
        } else {
            debug!(%event, priority, "event fell off the queue tail");
            Ingested::Dropped
        }
    }

    /// The escalation queue.
    pub const fn queue(&self) -> &EscalationQueue {
        &self.queue
    }

    /// Mutable access to the escalation queue, for draining or reloading.
    pub const fn queue_mut(&mut self) -> &mut EscalationQueue {
        &mut self.queue
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use colony_types::EventType;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000_i64.saturating_add(secs), 0).unwrap()
    }

    #[test]
    fn records_carry_role_priority_and_console_line() {
        let detection = Detection {
            event_type: EventType::CreepDied,
            value: Some(String::from("harvester:harvester40")),
        };
        let record = EscalationPipeline::record(detection, 40, at(0));
        assert_eq!(record.priority, 7);
        assert_eq!(record.raw, "[EVENT:CREEP_DIED:harvester:harvester40]");
        assert_eq!(record.tick, 40);
    }

    #[test]
    fn cooldown_sits_in_front_of_the_queue() {
        let mut pipeline = EscalationPipeline::new(&EventConfig::default());
        let hostile = |secs| {
            EscalationPipeline::record(
                Detection {
                    event_type: EventType::Hostile,
                    value: Some(String::from("1")),
                },
                1,
                at(secs),
            )
        };
        assert_eq!(pipeline.ingest(hostile(0)), Ingested::Queued);
        assert_eq!(pipeline.ingest(hostile(10)), Ingested::Suppressed);
        assert_eq!(pipeline.ingest(hostile(61)), Ingested::Queued);
        assert_eq!(pipeline.queue().len(), 2);
    }
}
