//! Runs the full tick cycle against the reference world.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use colony_core::{ColonyConfig, ColonyMemory, SpawnDecision, TickSummary, TowerAction, run_tick};
use colony_events::{EscalationPipeline, Ingested};
use colony_types::{Action, EnergyStore, EventType, Position, Role, StructureKind};
use colony_world::{GridWorld, new_structure};

fn step(world: &mut GridWorld, memory: &mut ColonyMemory, config: &ColonyConfig) -> TickSummary {
    let snapshot = world.snapshot().clone();
    let summary = run_tick(&snapshot, world, memory, config, Utc::now());
    world.advance();
    summary
}

#[test]
fn starter_colony_bootstraps() {
    let mut world = GridWorld::starter();
    let mut memory = ColonyMemory::new();
    let config = ColonyConfig::default();

    let mut spawned: Vec<(u64, Role, String)> = Vec::new();
    let mut summaries = Vec::new();
    for _ in 0..400 {
        let summary = step(&mut world, &mut memory, &config);
        if let SpawnDecision::Spawned { role, name, .. } = &summary.spawn {
            spawned.push((summary.tick, *role, name.clone()));
        }
        summaries.push(summary);
    }

    // The first job is an emergency harvester, issued on the very first tick.
    let (first_tick, first_role, first_name) = spawned.first().cloned().unwrap();
    assert_eq!(first_tick, 0);
    assert_eq!(first_role, Role::Harvester);
    assert_eq!(first_name, "harvester0");

    // Names follow `<role><tick>` and jobs never overlap.
    for (tick, role, name) in &spawned {
        assert_eq!(name, &format!("{role}{tick}"));
    }
    for pair in spawned.windows(2) {
        if let [(earlier, ..), (later, ..)] = pair {
            assert!(later.saturating_sub(*earlier) >= 9);
        }
    }

    let snapshot = world.snapshot();
    assert!(snapshot.workers.len() >= 2);
    assert!(snapshot.energy_harvested > 0);

    // Level 2 allows exactly five extensions, built or pending.
    let extensions = snapshot
        .count_structures(StructureKind::Extension)
        .saturating_add(snapshot.count_sites(StructureKind::Extension));
    assert_eq!(extensions, 5);

    // Status lines every 100 ticks.
    let status_ticks: Vec<u64> = summaries
        .iter()
        .filter(|s| s.status.is_some())
        .map(|s| s.tick)
        .collect();
    assert_eq!(status_ticks, vec![0, 100, 200, 300]);

    // Memory survives a JSON round trip.
    let json = memory.to_json().unwrap();
    assert_eq!(ColonyMemory::from_json(&json).unwrap(), memory);
}

#[test]
fn hostile_arrival_is_escalated_once_and_fought() {
    let mut world = GridWorld::starter();
    if let Some(controller) = world.snapshot_mut().controller.as_mut() {
        controller.level = 3;
    }
    let mut tower = new_structure(StructureKind::Tower, Position::new(25, 21));
    tower.store = Some(EnergyStore::new(1000, 1000));
    let tower_id = tower.id;
    world.snapshot_mut().structures.insert(tower_id, tower);

    let mut memory = ColonyMemory::new();
    let config = ColonyConfig::default();
    let mut pipeline = EscalationPipeline::new(&config.events);

    // Quiet first tick establishes the baseline.
    step(&mut world, &mut memory, &config);

    let hostile = world.add_hostile(Position::new(32, 23), 5000, "Invader");
    let summary = step(&mut world, &mut memory, &config);

    assert!(summary.towers.contains(&(tower_id, TowerAction::Attack(hostile))));
    let hostile_events: Vec<_> = summary
        .events
        .iter()
        .filter(|e| e.event_type == EventType::Hostile)
        .cloned()
        .collect();
    assert_eq!(hostile_events.len(), 1);
    for record in hostile_events {
        assert_eq!(record.priority, 10);
        assert_eq!(pipeline.ingest(record), Ingested::Queued);
    }

    // Still visible next tick: the detector stays quiet.
    let summary = step(&mut world, &mut memory, &config);
    assert!(!summary.events.iter().any(|e| e.event_type == EventType::Hostile));
    assert!(world.history().iter().any(|(action, outcome)| {
        outcome.is_accepted()
            && matches!(action, Action::TowerAttack { tower, .. } if *tower == tower_id)
    }));
    assert_eq!(pipeline.queue().len(), 1);
}

#[test]
fn rampart_queued_on_spawn_from_overlay_level() {
    let mut world = GridWorld::starter();
    if let Some(controller) = world.snapshot_mut().controller.as_mut() {
        controller.level = 3;
    }
    let mut memory = ColonyMemory::new();
    let config = ColonyConfig::default();

    let summary = step(&mut world, &mut memory, &config);

    let build = summary.build.unwrap();
    assert!(build.placed.contains(&(StructureKind::Rampart, Position::new(25, 23))));
    assert_eq!(build.placed_of(StructureKind::Extension), 10);
    assert_eq!(build.placed_of(StructureKind::Tower), 1);
}
