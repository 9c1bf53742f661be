//! In-memory reference world.
//!
//! [`GridWorld`] plays the host's part for tests and for the engine binary:
//! it owns a [`WorldSnapshot`] plus terrain, answers [`WorldQuery`] with a
//! Dijkstra travel cost over a 50x50 grid, and applies submitted actions with
//! the host's interaction ranges and all-or-nothing semantics. Between ticks,
//! [`GridWorld::advance`] ages workers, finishes production jobs, regenerates
//! sources, applies hostile damage, and decays the controller.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::path::Path;

use colony_types::{
    Action, ActionOutcome, AgentId, BodyPart, Controller, EnergyStore, Hostile, HostileId,
    Position, Role, SiteId, SourceId, SpawnJob, Spawner, Structure, StructureId, StructureKind,
    Terrain, Worker, WorldSnapshot, body_cost, spawn_duration,
};
use colony_types::{ConstructionSite, Source};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::caps;
use crate::error::WorldError;
use crate::query::WorldQuery;
use crate::sink::ActionSink;

/// Width and height of the map.
pub const MAP_SIZE: i32 = 50;

/// Compute charged per tick before any action.
const BASE_CPU: f64 = 0.5;

/// Compute charged per submitted action.
const INTENT_CPU: f64 = 0.2;

/// Lifetime of a freshly produced worker.
pub const WORKER_LIFETIME: u32 = 1500;

/// Ticks between source regenerations.
const SOURCE_REGEN_TICKS: u64 = 300;

/// Energy harvested per work part per action.
const HARVEST_PER_WORK: u32 = 2;

/// Build progress per work part per action.
const BUILD_PER_WORK: u32 = 5;

/// Hit points restored per work part per repair action.
const REPAIR_PER_WORK: u32 = 100;

/// Range of build, repair, and upgrade actions.
const WORK_RANGE: u32 = 3;

/// Energy a tower spends per action.
const TOWER_ACTION_COST: u32 = 10;

/// Damage a tower shot deals.
const TOWER_DAMAGE: u32 = 600;

/// Hit points a tower repair restores.
const TOWER_REPAIR: u32 = 800;

/// Damage a hostile deals per tick to spawns and towers within range 3.
const HOSTILE_STRUCTURE_DAMAGE: u32 = 30;

/// Damage a hostile deals per tick to adjacent workers.
const HOSTILE_WORKER_DAMAGE: u32 = 10;

/// The spawn refills itself by one energy per tick up to this amount.
const SPAWN_PASSIVE_CAP: u32 = 300;

/// Hit points per body part.
const HITS_PER_PART: u32 = 100;

/// Carry capacity per carry part.
const CARRY_PER_PART: u32 = 50;

/// Serialized form of a reference world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Initial world state.
    pub snapshot: WorldSnapshot,
    /// Impassable cells.
    #[serde(default)]
    pub walls: Vec<Position>,
    /// Slow cells.
    #[serde(default)]
    pub swamps: Vec<Position>,
}

/// What changed during [`GridWorld::advance`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Workers whose lifetime or hit points ran out.
    pub expired: Vec<AgentId>,
    /// Worker released by the production facility, if any.
    pub released: Option<AgentId>,
}

/// In-memory host used by tests and the engine binary.
#[derive(Debug, Clone)]
pub struct GridWorld {
    /// Current world state.
    snapshot: WorldSnapshot,
    /// Non-plain terrain cells.
    terrain: BTreeMap<Position, Terrain>,
    /// Loadout of the active production job.
    pending_body: Option<Vec<BodyPart>>,
    /// Compute charged in the current tick.
    cpu_spent: f64,
    /// Every submitted action with its outcome.
    history: Vec<(Action, ActionOutcome)>,
}

impl GridWorld {
    /// Wrap a snapshot with open terrain.
    pub const fn new(snapshot: WorldSnapshot) -> Self {
        Self {
            snapshot,
            terrain: BTreeMap::new(),
            pending_body: None,
            cpu_spent: 0.0,
            history: Vec::new(),
        }
    }

    /// Build a world from a scenario.
    pub fn from_scenario(scenario: Scenario) -> Self {
        let mut world = Self::new(scenario.snapshot);
        for pos in scenario.walls {
            world.terrain.insert(pos, Terrain::Wall);
        }
        for pos in scenario.swamps {
            world.terrain.insert(pos, Terrain::Swamp);
        }
        world
    }

    /// Parse a scenario from JSON.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        Ok(Self::from_scenario(scenario))
    }

    /// Load a scenario from a JSON file.
    pub fn load(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// A fresh level-2 colony: one full spawn, two sources, no workers.
    pub fn starter() -> Self {
        let spawn_pos = Position::new(25, 23);
        let mut spawn = caps::new_structure(StructureKind::Spawn, spawn_pos);
        spawn.store = Some(EnergyStore::new(300, 300));

        let mut snapshot = WorldSnapshot {
            controller: Some(Controller {
                pos: Position::new(25, 10),
                level: 2,
                progress: 0,
                progress_total: caps::progress_total(2),
                ticks_to_downgrade: caps::downgrade_ticks(2),
            }),
            spawner: Some(Spawner {
                structure_id: spawn.id,
                pos: spawn_pos,
                job: None,
            }),
            ..WorldSnapshot::default()
        };
        snapshot.structures.insert(spawn.id, spawn);
        for pos in [Position::new(10, 30), Position::new(40, 15)] {
            let source = Source {
                id: SourceId::new(),
                pos,
                energy: 3000,
                energy_capacity: 3000,
            };
            snapshot.sources.insert(source.id, source);
        }

        let mut world = Self::new(snapshot);
        for x in 15..=20 {
            world.terrain.insert(Position::new(x, 27), Terrain::Wall);
        }
        world
    }

    /// The current world state.
    pub const fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    /// Mutable access for scenario setup.
    pub const fn snapshot_mut(&mut self) -> &mut WorldSnapshot {
        &mut self.snapshot
    }

    /// Set the terrain of one cell.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) -> Result<(), WorldError> {
        if !in_bounds(pos) {
            return Err(WorldError::OutOfBounds(pos));
        }
        if terrain == Terrain::Plain {
            self.terrain.remove(&pos);
        } else {
            self.terrain.insert(pos, terrain);
        }
        Ok(())
    }

    /// Make a hostile visible at `pos`.
    pub fn add_hostile(&mut self, pos: Position, hits: u32, owner: &str) -> HostileId {
        let hostile = Hostile {
            id: HostileId::new(),
            pos,
            hits,
            owner: owner.to_owned(),
        };
        let id = hostile.id;
        self.snapshot.hostiles.insert(id, hostile);
        id
    }

    /// Every submitted action with its outcome.
    pub fn history(&self) -> &[(Action, ActionOutcome)] {
        &self.history
    }

    /// Take the action history, leaving it empty.
    pub fn take_history(&mut self) -> Vec<(Action, ActionOutcome)> {
        std::mem::take(&mut self.history)
    }

    /// Move the world forward one tick.
    pub fn advance(&mut self) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        self.snapshot.tick = self.snapshot.tick.saturating_add(1);
        self.cpu_spent = 0.0;

        self.apply_hostile_damage();

        for worker in self.snapshot.workers.values_mut() {
            if let Some(ttl) = worker.ticks_to_live.as_mut() {
                *ttl = ttl.saturating_sub(1);
                if *ttl == 0 || worker.hits == 0 {
                    report.expired.push(worker.id);
                }
            }
        }
        for id in &report.expired {
            self.snapshot.workers.remove(id);
        }

        let finished = self.snapshot.spawner.as_mut().and_then(|facility| {
            let job = facility.job.as_mut()?;
            job.remaining_ticks = job.remaining_ticks.saturating_sub(1);
            if job.remaining_ticks > 0 {
                return None;
            }
            facility.job.take().map(|job| (job, facility.pos))
        });
        if let Some((job, pos)) = finished {
            let worker = self.release_worker(job, pos);
            report.released = Some(worker.id);
            self.snapshot.workers.insert(worker.id, worker);
        }

        if self.snapshot.tick.checked_rem(SOURCE_REGEN_TICKS) == Some(0) {
            for source in self.snapshot.sources.values_mut() {
                source.energy = source.energy_capacity;
            }
        }

        if let Some(controller) = self.snapshot.controller.as_mut() {
            controller.ticks_to_downgrade = controller.ticks_to_downgrade.saturating_sub(1);
            if controller.ticks_to_downgrade == 0 && controller.level > 1 {
                controller.level = controller.level.saturating_sub(1);
                controller.progress = 0;
                controller.progress_total = caps::progress_total(controller.level);
                controller.ticks_to_downgrade = caps::downgrade_ticks(controller.level);
            }
        }

        for spawn in self
            .snapshot
            .structures
            .values_mut()
            .filter(|s| s.kind == StructureKind::Spawn)
        {
            if let Some(store) = spawn.store.as_mut()
                && store.energy < SPAWN_PASSIVE_CAP
            {
                store.energy = store.energy.saturating_add(1).min(store.capacity);
            }
        }

        report
    }

    fn release_worker(&mut self, job: SpawnJob, spawn_pos: Position) -> Worker {
        let body = self.pending_body.take().unwrap_or_default();
        let parts = u32::try_from(body.len()).unwrap_or(u32::MAX);
        let carry = u32::try_from(body.iter().filter(|p| **p == BodyPart::Carry).count())
            .unwrap_or(u32::MAX);
        let hits = parts.saturating_mul(HITS_PER_PART);
        Worker {
            id: AgentId::new(),
            name: job.name,
            role: job.role,
            pos: spawn_pos.offset(0, 1),
            store: EnergyStore::new(0, carry.saturating_mul(CARRY_PER_PART)),
            hits,
            hits_max: hits,
            ticks_to_live: Some(WORKER_LIFETIME),
            body,
        }
    }

    fn apply_hostile_damage(&mut self) {
        let hostiles: Vec<Position> = self.snapshot.hostiles.values().map(|h| h.pos).collect();
        for pos in hostiles {
            for structure in self
                .snapshot
                .structures
                .values_mut()
                .filter(|s| s.kind.needs_overlay() && s.pos.range_to(pos) <= 3)
            {
                structure.hits = structure.hits.saturating_sub(HOSTILE_STRUCTURE_DAMAGE);
            }
            for worker in self
                .snapshot
                .workers
                .values_mut()
                .filter(|w| w.pos.range_to(pos) <= 1)
            {
                worker.hits = worker.hits.saturating_sub(HOSTILE_WORKER_DAMAGE);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Terrain and pathing
    // -----------------------------------------------------------------------

    fn blocked_cells(&self) -> BTreeSet<Position> {
        let mut blocked: BTreeSet<Position> = self
            .terrain
            .iter()
            .filter(|(_, t)| **t == Terrain::Wall)
            .map(|(pos, _)| *pos)
            .collect();
        blocked.extend(
            self.snapshot
                .structures
                .values()
                .filter(|s| {
                    !matches!(
                        s.kind,
                        StructureKind::Road | StructureKind::Rampart | StructureKind::Container
                    )
                })
                .map(|s| s.pos),
        );
        blocked.extend(self.snapshot.sources.values().map(|s| s.pos));
        if let Some(controller) = &self.snapshot.controller {
            blocked.insert(controller.pos);
        }
        blocked
    }

    fn step_cost(&self, pos: Position) -> u32 {
        match self.terrain.get(&pos) {
            Some(Terrain::Swamp) => 5,
            _ => 1,
        }
    }

    /// Dijkstra from `origin`, stopping once `goal` is settled. The goal cell
    /// itself may be blocked (sources, structures).
    fn distances(&self, origin: Position, goal: Position) -> BTreeMap<Position, u32> {
        let blocked = self.blocked_cells();
        let mut dist = BTreeMap::new();
        let mut heap = BinaryHeap::new();
        dist.insert(origin, 0_u32);
        heap.push(Reverse((0_u32, origin)));

        while let Some(Reverse((cost, pos))) = heap.pop() {
            if pos == goal {
                break;
            }
            if dist.get(&pos).is_some_and(|&d| cost > d) {
                continue;
            }
            for next in neighbors(pos) {
                if next != goal && blocked.contains(&next) {
                    continue;
                }
                let next_cost = cost.saturating_add(self.step_cost(next));
                if dist.get(&next).is_none_or(|&d| next_cost < d) {
                    dist.insert(next, next_cost);
                    heap.push(Reverse((next_cost, next)));
                }
            }
        }
        dist
    }

    /// The neighbor of `from` that lies on a cheapest path toward `to`.
    fn step_toward(&self, from: Position, to: Position) -> Option<Position> {
        let dist = self.distances(to, from);
        let blocked = self.blocked_cells();
        neighbors(from)
            .into_iter()
            .filter(|n| !blocked.contains(n))
            .filter_map(|n| dist.get(&n).map(|d| (*d, n)))
            .min()
            .map(|(_, n)| n)
    }

    // -----------------------------------------------------------------------
    // Action handlers
    // -----------------------------------------------------------------------

    fn harvest(&mut self, worker: AgentId, source: SourceId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(s) = snap.sources.get_mut(&source) else {
            return ActionOutcome::failed("unknown source");
        };
        if w.pos.range_to(s.pos) > 1 {
            return ActionOutcome::NotInRange;
        }
        if s.energy == 0 {
            return ActionOutcome::failed("source depleted");
        }
        let free = w.store.free_capacity();
        if free == 0 {
            return ActionOutcome::failed("worker full");
        }
        let amount = w
            .work_parts()
            .saturating_mul(HARVEST_PER_WORK)
            .min(free)
            .min(s.energy);
        s.energy = s.energy.saturating_sub(amount);
        w.store.energy = w.store.energy.saturating_add(amount);
        snap.energy_harvested = snap.energy_harvested.saturating_add(u64::from(amount));
        ActionOutcome::Accepted
    }

    fn transfer(&mut self, worker: AgentId, target: StructureId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(s) = snap.structures.get_mut(&target) else {
            return ActionOutcome::failed("unknown structure");
        };
        if w.pos.range_to(s.pos) > 1 {
            return ActionOutcome::NotInRange;
        }
        let Some(store) = s.store.as_mut() else {
            return ActionOutcome::failed("structure has no store");
        };
        if store.is_full() {
            return ActionOutcome::failed("target full");
        }
        if w.store.is_empty() {
            return ActionOutcome::failed("nothing carried");
        }
        let amount = w.store.energy.min(store.free_capacity());
        store.energy = store.energy.saturating_add(amount);
        w.store.energy = w.store.energy.saturating_sub(amount);
        ActionOutcome::Accepted
    }

    fn withdraw(&mut self, worker: AgentId, from: StructureId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(s) = snap.structures.get_mut(&from) else {
            return ActionOutcome::failed("unknown structure");
        };
        if w.pos.range_to(s.pos) > 1 {
            return ActionOutcome::NotInRange;
        }
        let Some(store) = s.store.as_mut() else {
            return ActionOutcome::failed("structure has no store");
        };
        if store.is_empty() {
            return ActionOutcome::failed("structure empty");
        }
        let amount = store.energy.min(w.store.free_capacity());
        if amount == 0 {
            return ActionOutcome::failed("worker full");
        }
        store.energy = store.energy.saturating_sub(amount);
        w.store.energy = w.store.energy.saturating_add(amount);
        ActionOutcome::Accepted
    }

    fn build(&mut self, worker: AgentId, site: SiteId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(s) = snap.sites.get_mut(&site) else {
            return ActionOutcome::failed("unknown site");
        };
        if w.pos.range_to(s.pos) > WORK_RANGE {
            return ActionOutcome::NotInRange;
        }
        if w.store.is_empty() {
            return ActionOutcome::failed("nothing carried");
        }
        let remaining = s.progress_total.saturating_sub(s.progress);
        let amount = w
            .work_parts()
            .saturating_mul(BUILD_PER_WORK)
            .min(w.store.energy)
            .min(remaining);
        s.progress = s.progress.saturating_add(amount);
        w.store.energy = w.store.energy.saturating_sub(amount);
        let completed = (s.progress >= s.progress_total).then_some((s.kind, s.pos));

        if let Some((kind, pos)) = completed {
            snap.sites.remove(&site);
            let structure = caps::new_structure(kind, pos);
            debug!(%kind, %pos, "construction completed");
            snap.structures.insert(structure.id, structure);
        }
        ActionOutcome::Accepted
    }

    fn repair(&mut self, worker: AgentId, target: StructureId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(s) = snap.structures.get_mut(&target) else {
            return ActionOutcome::failed("unknown structure");
        };
        if w.pos.range_to(s.pos) > WORK_RANGE {
            return ActionOutcome::NotInRange;
        }
        if s.hits >= s.hits_max {
            return ActionOutcome::failed("full health");
        }
        if w.store.is_empty() {
            return ActionOutcome::failed("nothing carried");
        }
        let spent = w.work_parts().min(w.store.energy);
        w.store.energy = w.store.energy.saturating_sub(spent);
        s.hits = s
            .hits
            .saturating_add(spent.saturating_mul(REPAIR_PER_WORK))
            .min(s.hits_max);
        ActionOutcome::Accepted
    }

    fn upgrade(&mut self, worker: AgentId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(w) = snap.workers.get_mut(&worker) else {
            return ActionOutcome::failed("unknown worker");
        };
        let Some(c) = snap.controller.as_mut() else {
            return ActionOutcome::failed("no controller");
        };
        if w.pos.range_to(c.pos) > WORK_RANGE {
            return ActionOutcome::NotInRange;
        }
        if w.store.is_empty() {
            return ActionOutcome::failed("nothing carried");
        }
        let spent = w.work_parts().min(w.store.energy);
        w.store.energy = w.store.energy.saturating_sub(spent);
        c.progress = c.progress.saturating_add(u64::from(spent));
        c.ticks_to_downgrade = caps::downgrade_ticks(c.level);
        if c.level < caps::MAX_LEVEL && c.progress >= c.progress_total {
            c.progress = c.progress.saturating_sub(c.progress_total);
            c.level = c.level.saturating_add(1);
            c.progress_total = caps::progress_total(c.level);
            c.ticks_to_downgrade = caps::downgrade_ticks(c.level);
        }
        ActionOutcome::Accepted
    }

    fn move_to(&mut self, worker: AgentId, to: Position) -> ActionOutcome {
        let Some(from) = self.snapshot.workers.get(&worker).map(|w| w.pos) else {
            return ActionOutcome::failed("unknown worker");
        };
        if from == to {
            return ActionOutcome::Accepted;
        }
        let Some(next) = self.step_toward(from, to) else {
            return ActionOutcome::failed("no path");
        };
        if let Some(w) = self.snapshot.workers.get_mut(&worker) {
            w.pos = next;
        }
        ActionOutcome::Accepted
    }

    fn tower_attack(&mut self, tower: StructureId, hostile: HostileId) -> ActionOutcome {
        let snap = &mut self.snapshot;
        let Some(t) = snap.structures.get_mut(&tower) else {
            return ActionOutcome::failed("unknown tower");
        };
        let Some(store) = t.store.as_mut().filter(|_| t.kind == StructureKind::Tower) else {
            return ActionOutcome::failed("not a tower");
        };
        if store.energy < TOWER_ACTION_COST {
            return ActionOutcome::failed("tower empty");
        }
        let Some(h) = snap.hostiles.get_mut(&hostile) else {
            return ActionOutcome::failed("unknown hostile");
        };
        store.energy = store.energy.saturating_sub(TOWER_ACTION_COST);
        h.hits = h.hits.saturating_sub(TOWER_DAMAGE);
        if h.hits == 0 {
            snap.hostiles.remove(&hostile);
        }
        ActionOutcome::Accepted
    }

    fn tower_repair(&mut self, tower: StructureId, target: StructureId) -> ActionOutcome {
        let has_energy = self
            .snapshot
            .structures
            .get(&tower)
            .filter(|t| t.kind == StructureKind::Tower)
            .map(Structure::stored_energy);
        let Some(energy) = has_energy else {
            return ActionOutcome::failed("not a tower");
        };
        if energy < TOWER_ACTION_COST {
            return ActionOutcome::failed("tower empty");
        }
        let Some(s) = self.snapshot.structures.get_mut(&target) else {
            return ActionOutcome::failed("unknown structure");
        };
        if s.hits >= s.hits_max {
            return ActionOutcome::failed("full health");
        }
        s.hits = s.hits.saturating_add(TOWER_REPAIR).min(s.hits_max);
        if let Some(store) = self
            .snapshot
            .structures
            .get_mut(&tower)
            .and_then(|t| t.store.as_mut())
        {
            store.energy = store.energy.saturating_sub(TOWER_ACTION_COST);
        }
        ActionOutcome::Accepted
    }

    fn spawn(
        &mut self,
        spawner: StructureId,
        name: String,
        role: Role,
        body: Vec<BodyPart>,
    ) -> ActionOutcome {
        let Some(facility) = self.snapshot.spawner.as_ref() else {
            return ActionOutcome::failed("no spawner");
        };
        if facility.structure_id != spawner {
            return ActionOutcome::failed("unknown spawner");
        }
        if facility.is_busy() {
            return ActionOutcome::failed("busy");
        }
        if body.is_empty() {
            return ActionOutcome::failed("empty body");
        }
        let cost = body_cost(&body);
        if self.snapshot.energy_available() < cost {
            return ActionOutcome::failed("not enough energy");
        }
        self.drain_production_energy(cost);
        let remaining_ticks = spawn_duration(&body);
        if let Some(facility) = self.snapshot.spawner.as_mut() {
            facility.job = Some(SpawnJob {
                name,
                role,
                remaining_ticks,
            });
        }
        self.pending_body = Some(body);
        ActionOutcome::Accepted
    }

    /// Take `cost` energy from spawns first, then extensions.
    fn drain_production_energy(&mut self, cost: u32) {
        let mut owed = cost;
        for kind in [StructureKind::Spawn, StructureKind::Extension] {
            for structure in self
                .snapshot
                .structures
                .values_mut()
                .filter(|s| s.kind == kind)
            {
                if owed == 0 {
                    return;
                }
                if let Some(store) = structure.store.as_mut() {
                    let taken = store.energy.min(owed);
                    store.energy = store.energy.saturating_sub(taken);
                    owed = owed.saturating_sub(taken);
                }
            }
        }
    }

    fn place_site(&mut self, kind: StructureKind, pos: Position) -> ActionOutcome {
        if !in_bounds(pos) {
            return ActionOutcome::failed("out of bounds");
        }
        if self.terrain(pos) == Terrain::Wall {
            return ActionOutcome::failed("invalid terrain");
        }
        if self.snapshot.sites_at(pos).next().is_some() {
            return ActionOutcome::failed("site exists");
        }
        let landmark = self.snapshot.sources.values().any(|s| s.pos == pos)
            || self.snapshot.controller.as_ref().is_some_and(|c| c.pos == pos);
        if landmark {
            return ActionOutcome::failed("occupied");
        }
        let occupied = if kind == StructureKind::Rampart {
            self.snapshot
                .structures_at(pos)
                .any(|s| s.kind == StructureKind::Rampart)
        } else {
            self.snapshot.structures_at(pos).next().is_some()
        };
        if occupied {
            return ActionOutcome::failed("occupied");
        }
        let planned = self
            .snapshot
            .count_structures(kind)
            .saturating_add(self.snapshot.count_sites(kind));
        if planned >= caps::max_structures(kind, self.snapshot.level()) {
            return ActionOutcome::failed("structure limit");
        }
        let site = ConstructionSite {
            id: SiteId::new(),
            kind,
            pos,
            progress: 0,
            progress_total: caps::build_cost(kind),
        };
        self.snapshot.sites.insert(site.id, site);
        ActionOutcome::Accepted
    }
}

impl WorldQuery for GridWorld {
    fn path_cost(&self, from: Position, to: Position) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        self.distances(from, to).get(&to).copied()
    }

    fn terrain(&self, pos: Position) -> Terrain {
        if !in_bounds(pos) {
            return Terrain::Wall;
        }
        self.terrain.get(&pos).copied().unwrap_or_default()
    }

    fn cpu_used(&self) -> f64 {
        BASE_CPU + self.cpu_spent
    }
}

impl ActionSink for GridWorld {
    fn submit(&mut self, action: Action) -> ActionOutcome {
        self.cpu_spent += INTENT_CPU;
        let outcome = match action.clone() {
            Action::Harvest { worker, source } => self.harvest(worker, source),
            Action::Transfer { worker, target } => self.transfer(worker, target),
            Action::Withdraw { worker, from } => self.withdraw(worker, from),
            Action::Build { worker, site } => self.build(worker, site),
            Action::Repair { worker, target } => self.repair(worker, target),
            Action::Upgrade { worker } => self.upgrade(worker),
            Action::MoveTo { worker, to } => self.move_to(worker, to),
            Action::TowerAttack { tower, hostile } => self.tower_attack(tower, hostile),
            Action::TowerRepair { tower, target } => self.tower_repair(tower, target),
            Action::Spawn {
                spawner,
                name,
                role,
                body,
            } => self.spawn(spawner, name, role, body),
            Action::PlaceSite { kind, pos } => self.place_site(kind, pos),
        };
        self.history.push((action, outcome.clone()));
        outcome
    }
}

const fn in_bounds(pos: Position) -> bool {
    pos.x >= 0 && pos.y >= 0 && pos.x < MAP_SIZE && pos.y < MAP_SIZE
}

fn neighbors(pos: Position) -> Vec<Position> {
    let mut out = Vec::with_capacity(8);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let next = pos.offset(dx, dy);
            if in_bounds(next) {
                out.push(next);
            }
        }
    }
    out
}
