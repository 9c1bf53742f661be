//! Per-worker persisted memory.
//!
//! Each live worker owns one [`WorkerMemory`] entry in the
//! [`WorkerMemoryStore`]. Entries are created the first time a worker is
//! run and pruned the tick its id disappears from the roster. Everything
//! stored here can be re-derived, so a tick cut short by the host never
//! leaves an entry the next tick cannot resume from.

use std::collections::BTreeMap;

use colony_types::{AgentId, Role, SourceId, TaskMode, Worker, WorldSnapshot};
use serde::{Deserialize, Serialize};

use crate::target::CachedTarget;

/// What the colony remembers about one worker between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMemory {
    /// Current half of the gather/deliver cycle.
    pub mode: TaskMode,
    /// Cached delivery target, validated every tick.
    pub target: Option<CachedTarget>,
    /// Cached source, validated every tick.
    pub source: Option<SourceId>,
    /// Role the worker had when last seen.
    pub role: Role,
}

impl WorkerMemory {
    /// Fresh memory for a worker of the given role.
    pub const fn new(role: Role) -> Self {
        Self {
            mode: TaskMode::Gathering,
            target: None,
            source: None,
            role,
        }
    }
}

/// Memory entries for every worker, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerMemoryStore {
    entries: BTreeMap<AgentId, WorkerMemory>,
}

impl WorkerMemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The entry for `worker`, created on first reference.
    pub fn entry(&mut self, worker: &Worker) -> &mut WorkerMemory {
        let memory = self
            .entries
            .entry(worker.id)
            .or_insert_with(|| WorkerMemory::new(worker.role));
        memory.role = worker.role;
        memory
    }

    /// Look up an entry without creating it.
    pub fn get(&self, id: &AgentId) -> Option<&WorkerMemory> {
        self.entries.get(id)
    }

    /// Drop entries whose worker is gone. Returns the pruned ids with the
    /// role each had when last seen.
    pub fn prune(&mut self, snapshot: &WorldSnapshot) -> Vec<(AgentId, Role)> {
        let gone: Vec<(AgentId, Role)> = self
            .entries
            .iter()
            .filter(|(id, _)| !snapshot.workers.contains_key(id))
            .map(|(id, memory)| (*id, memory.role))
            .collect();
        for (id, _) in &gone {
            self.entries.remove(id);
        }
        gone
    }

    /// Number of tracked workers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no worker is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{BodyPart, EnergyStore, Position};

    use super::*;

    fn make_worker(role: Role) -> Worker {
        Worker {
            id: AgentId::new(),
            name: format!("{role}1"),
            role,
            pos: Position::new(10, 10),
            store: EnergyStore::new(0, 50),
            hits: 300,
            hits_max: 300,
            ticks_to_live: Some(1500),
            body: vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move],
        }
    }

    #[test]
    fn entries_are_created_lazily() {
        let mut store = WorkerMemoryStore::new();
        let worker = make_worker(Role::Builder);
        assert!(store.get(&worker.id).is_none());

        let memory = store.entry(&worker);
        assert_eq!(memory.mode, TaskMode::Gathering);
        assert_eq!(memory.role, Role::Builder);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn prune_reports_last_known_role() {
        let mut store = WorkerMemoryStore::new();
        let alive = make_worker(Role::Harvester);
        let dead = make_worker(Role::Upgrader);
        store.entry(&alive);
        store.entry(&dead);

        let mut snapshot = WorldSnapshot::default();
        snapshot.workers.insert(alive.id, alive.clone());

        let pruned = store.prune(&snapshot);
        assert_eq!(pruned, vec![(dead.id, Role::Upgrader)]);
        assert!(store.get(&dead.id).is_none());
        assert!(store.get(&alive.id).is_some());
        assert!(store.prune(&snapshot).is_empty());
    }

    #[test]
    fn store_roundtrips_through_json() {
        let mut store = WorkerMemoryStore::new();
        let worker = make_worker(Role::Harvester);
        store.entry(&worker).mode = TaskMode::Delivering;

        let json = serde_json::to_string(&store).unwrap();
        let back: WorkerMemoryStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }
}
