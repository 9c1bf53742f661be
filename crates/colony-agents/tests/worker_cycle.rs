//! Drives a worker through full gather/deliver cycles in the reference world.

#![allow(clippy::unwrap_used)]

use colony_agents::{RoleConfig, RoleContext, WorkerMemoryStore, WorkerTurn, run_worker};
use colony_types::{
    Action, AgentId, BodyPart, EnergyStore, Position, Role, StructureKind, TaskMode, Worker,
};
use colony_world::{ActionSink, GridWorld};

fn make_worker(role: Role, pos: Position) -> Worker {
    Worker {
        id: AgentId::new(),
        name: format!("{role}0"),
        role,
        pos,
        store: EnergyStore::new(0, 50),
        hits: 300,
        hits_max: 300,
        ticks_to_live: Some(1500),
        body: vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move],
    }
}

fn tick(world: &mut GridWorld, memory: &mut WorkerMemoryStore, config: &RoleConfig) -> Vec<WorkerTurn> {
    let snapshot = world.snapshot().clone();
    let ctx = RoleContext {
        snapshot: &snapshot,
        config,
    };
    let mut turns = Vec::new();
    for worker in snapshot.workers.values() {
        let entry = memory.entry(worker);
        turns.push(run_worker(worker, entry, &ctx, world));
    }
    world.advance();
    turns
}

#[test]
fn harvester_delivers_to_the_spawn() {
    let mut world = GridWorld::starter();
    for spawn in world.snapshot_mut().structures.values_mut() {
        if let Some(store) = spawn.store.as_mut() {
            store.energy = 0;
        }
    }
    let harvester = make_worker(Role::Harvester, Position::new(11, 30));
    let id = harvester.id;
    world.snapshot_mut().workers.insert(id, harvester);

    let mut memory = WorkerMemoryStore::new();
    let config = RoleConfig::default();
    let mut saw_delivering = false;
    for _ in 0..200 {
        tick(&mut world, &mut memory, &config);
        saw_delivering |= memory.get(&id).is_some_and(|m| m.mode == TaskMode::Delivering);
    }

    assert!(saw_delivering);
    assert!(world.snapshot().energy_harvested >= 50);
    let spawn_id = world
        .snapshot()
        .structures
        .values()
        .find(|s| s.kind == StructureKind::Spawn)
        .map(|s| s.id)
        .unwrap();
    assert!(world.history().iter().any(|(action, outcome)| {
        outcome.is_accepted()
            && matches!(action, Action::Transfer { target, .. } if *target == spawn_id)
    }));
}

#[test]
fn builder_completes_a_construction_site() {
    let mut world = GridWorld::starter();
    let placed = world.submit(Action::PlaceSite {
        kind: StructureKind::Road,
        pos: Position::new(12, 33),
    });
    assert!(placed.is_accepted());
    let builder = make_worker(Role::Builder, Position::new(11, 31));
    world.snapshot_mut().workers.insert(builder.id, builder);

    let mut memory = WorkerMemoryStore::new();
    let config = RoleConfig::default();
    let mut turns = Vec::new();
    for _ in 0..600 {
        turns.extend(tick(&mut world, &mut memory, &config));
        if world.snapshot().count_structures(StructureKind::Road) == 1 {
            break;
        }
    }

    assert_eq!(world.snapshot().count_sites(StructureKind::Road), 0);
    assert_eq!(world.snapshot().count_structures(StructureKind::Road), 1);
    assert!(!turns.contains(&WorkerTurn::NoViableTarget));
}
