//! Console lines in, pending-events file out.

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, Utc};
use colony_events::{
    Detection, EscalationPipeline, EscalationQueue, EventConfig, Ingested, MAX_QUEUED,
    parse_console_line,
};
use colony_types::EventType;

fn feed(pipeline: &mut EscalationPipeline, lines: &[&str]) -> Vec<Ingested> {
    let start = Utc::now();
    lines
        .iter()
        .zip(0_i64..)
        .filter_map(|(line, offset)| {
            let parsed = parse_console_line(line)?;
            let detection = Detection {
                event_type: parsed.event_type,
                value: parsed.value,
            };
            let now = start + TimeDelta::seconds(offset);
            Some(pipeline.ingest(EscalationPipeline::record(detection, 0, now)))
        })
        .collect()
}

#[test]
fn monitor_flow_sorts_dedupes_and_persists() {
    let mut pipeline = EscalationPipeline::new(&EventConfig::default());
    let outcomes = feed(
        &mut pipeline,
        &[
            "[EVENT:ENERGY_MILESTONE:1000]",
            "Spawning harvester: harvester300 [3 parts]",
            "[EVENT:CREEP_DIED:builder:builder12]",
            "[EVENT:HOSTILE:2]",
            "[EVENT:HOSTILE:3]",
            "[EVENT:CREEP_DIED:harvester:harvester9]",
            "[EVENT:RCL_UP:3]",
        ],
    );
    assert_eq!(outcomes.len(), 6);
    assert_eq!(
        outcomes.iter().filter(|o| **o == Ingested::Suppressed).count(),
        2
    );

    let queued: Vec<(EventType, u8)> = pipeline
        .queue()
        .entries()
        .iter()
        .map(|e| (e.event_type, e.priority))
        .collect();
    assert_eq!(
        queued,
        vec![
            (EventType::Hostile, 10),
            (EventType::CreepDied, 6),
            (EventType::RclUp, 5),
            (EventType::EnergyMilestone, 1),
        ]
    );

    let dir = std::env::temp_dir().join(format!("colony-events-{}", std::process::id()));
    let path = dir.join("events").join("pending.json");
    pipeline.queue().save(&path).unwrap();

    let mut reloaded = EscalationQueue::new();
    reloaded.load(&path).unwrap();
    assert_eq!(reloaded.entries(), pipeline.queue().entries());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file_loads_as_empty() {
    let mut queue = EscalationQueue::new();
    queue
        .load(std::path::Path::new("/nonexistent/colony/pending.json"))
        .unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), MAX_QUEUED);
}
