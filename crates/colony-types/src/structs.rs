//! Entity structs making up the per-tick world view.
//!
//! The host builds a fresh [`WorldSnapshot`] every tick. Nothing in here is
//! mutated by the decision engine; changes happen only through the action
//! interface and show up in the next snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BodyPart, Role, StructureKind};
use crate::ids::{AgentId, HostileId, SiteId, SourceId, StructureId};

// ---------------------------------------------------------------------------
// Position and stores
// ---------------------------------------------------------------------------

/// A cell on the colony map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position from coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Straight-line (Chebyshev) range, the metric interaction ranges use.
    pub const fn range_to(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Energy held by a worker or structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnergyStore {
    /// Energy currently held.
    pub energy: u32,
    /// Maximum energy that fits.
    pub capacity: u32,
}

impl EnergyStore {
    /// Create a store holding `energy` out of `capacity`.
    pub const fn new(energy: u32, capacity: u32) -> Self {
        Self { energy, capacity }
    }

    /// Room left before the store is full.
    pub const fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.energy)
    }

    /// `true` when no more energy fits.
    pub const fn is_full(&self) -> bool {
        self.free_capacity() == 0
    }

    /// `true` when the store holds nothing.
    pub const fn is_empty(&self) -> bool {
        self.energy == 0
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A mobile worker owned by the colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Worker {
    /// Stable identity.
    pub id: AgentId,
    /// Display name (`<role><tick>`).
    pub name: String,
    /// Role assigned at production time.
    pub role: Role,
    /// Current cell.
    pub pos: Position,
    /// Carried energy.
    pub store: EnergyStore,
    /// Current hit points.
    pub hits: u32,
    /// Maximum hit points.
    pub hits_max: u32,
    /// Remaining lifetime; `None` while the worker is still being produced.
    pub ticks_to_live: Option<u32>,
    /// Capability loadout.
    pub body: Vec<BodyPart>,
}

impl Worker {
    /// Number of [`BodyPart::Work`] units, the throughput multiplier.
    pub fn work_parts(&self) -> u32 {
        let count = self
            .body
            .iter()
            .filter(|part| matches!(part, BodyPart::Work))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// A built structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Structure {
    /// Stable identity.
    pub id: StructureId,
    /// What was built.
    pub kind: StructureKind,
    /// Cell the structure occupies.
    pub pos: Position,
    /// Current hit points.
    pub hits: u32,
    /// Maximum hit points.
    pub hits_max: u32,
    /// Energy store, for structures that have one.
    pub store: Option<EnergyStore>,
}

impl Structure {
    /// Room left in the energy store (0 for structures without one).
    pub fn free_energy_capacity(&self) -> u32 {
        self.store.map_or(0, |store| store.free_capacity())
    }

    /// Energy currently held (0 for structures without a store).
    pub fn stored_energy(&self) -> u32 {
        self.store.map_or(0, |store| store.energy)
    }

    /// `true` if hit points are strictly below `fraction` of the maximum.
    pub fn is_below_fraction(&self, fraction: f64) -> bool {
        f64::from(self.hits) < f64::from(self.hits_max) * fraction
    }
}

/// A structure waiting to be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConstructionSite {
    /// Stable identity.
    pub id: SiteId,
    /// The structure kind the site will become.
    pub kind: StructureKind,
    /// Cell the site occupies.
    pub pos: Position,
    /// Build progress so far.
    pub progress: u32,
    /// Progress needed to finish.
    pub progress_total: u32,
}

/// An energy source workers harvest from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Source {
    /// Stable identity.
    pub id: SourceId,
    /// Cell the source occupies.
    pub pos: Position,
    /// Energy left until the next regeneration.
    pub energy: u32,
    /// Energy restored on regeneration.
    pub energy_capacity: u32,
}

/// A visible hostile entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hostile {
    /// Stable identity.
    pub id: HostileId,
    /// Current cell.
    pub pos: Position,
    /// Current hit points.
    pub hits: u32,
    /// Owning player name.
    pub owner: String,
}

/// The controlling authority of the colony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Controller {
    /// Cell the controller occupies.
    pub pos: Position,
    /// Authority level (tier).
    pub level: u8,
    /// Progress toward the next level.
    pub progress: u64,
    /// Progress required for the next level.
    pub progress_total: u64,
    /// Ticks until the level decays without an upgrade contribution.
    pub ticks_to_downgrade: u32,
}

/// A production job in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpawnJob {
    /// Name of the worker being produced.
    pub name: String,
    /// Role of the worker being produced.
    pub role: Role,
    /// Ticks until the worker is released.
    pub remaining_ticks: u32,
}

/// The production facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Spawner {
    /// The spawn structure backing this facility.
    pub structure_id: StructureId,
    /// Cell the spawn occupies.
    pub pos: Position,
    /// Active job, if any. At most one at a time.
    pub job: Option<SpawnJob>,
}

impl Spawner {
    /// `true` while a job is active.
    pub const fn is_busy(&self) -> bool {
        self.job.is_some()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only view of the colony for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Host tick counter.
    pub tick: u64,
    /// Live workers keyed by ID.
    pub workers: BTreeMap<AgentId, Worker>,
    /// Built structures keyed by ID.
    pub structures: BTreeMap<StructureId, Structure>,
    /// Pending construction sites keyed by ID (IDs are time-ordered, so
    /// iteration order is placement order).
    pub sites: BTreeMap<SiteId, ConstructionSite>,
    /// Energy sources keyed by ID.
    pub sources: BTreeMap<SourceId, Source>,
    /// Visible hostiles keyed by ID.
    pub hostiles: BTreeMap<HostileId, Hostile>,
    /// The controlling authority, if the colony still holds one.
    pub controller: Option<Controller>,
    /// The production facility, if one exists.
    pub spawner: Option<Spawner>,
    /// Cumulative energy harvested by the colony.
    pub energy_harvested: u64,
}

impl WorldSnapshot {
    /// Authority level, or 0 without a controller.
    pub fn level(&self) -> u8 {
        self.controller.as_ref().map_or(0, |c| c.level)
    }

    /// Energy the production facility can draw on right now.
    pub fn energy_available(&self) -> u32 {
        self.structures
            .values()
            .filter(|s| s.kind.is_production_sink())
            .fold(0_u32, |acc, s| acc.saturating_add(s.stored_energy()))
    }

    /// Energy the production facility could draw on with every sink full.
    pub fn energy_capacity_available(&self) -> u32 {
        self.structures
            .values()
            .filter(|s| s.kind.is_production_sink())
            .fold(0_u32, |acc, s| {
                acc.saturating_add(s.store.map_or(0, |store| store.capacity))
            })
    }

    /// Built structures of one kind.
    pub fn structures_of(&self, kind: StructureKind) -> impl Iterator<Item = &Structure> + '_ {
        self.structures.values().filter(move |s| s.kind == kind)
    }

    /// Number of built structures of one kind.
    pub fn count_structures(&self, kind: StructureKind) -> u32 {
        u32::try_from(self.structures_of(kind).count()).unwrap_or(u32::MAX)
    }

    /// Number of pending sites of one kind.
    pub fn count_sites(&self, kind: StructureKind) -> u32 {
        let count = self.sites.values().filter(|s| s.kind == kind).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Built structures standing on `pos`.
    pub fn structures_at(&self, pos: Position) -> impl Iterator<Item = &Structure> + '_ {
        self.structures.values().filter(move |s| s.pos == pos)
    }

    /// Pending sites on `pos`.
    pub fn sites_at(&self, pos: Position) -> impl Iterator<Item = &ConstructionSite> + '_ {
        self.sites.values().filter(move |s| s.pos == pos)
    }

    /// The first storage structure, if any.
    pub fn storage(&self) -> Option<&Structure> {
        self.structures_of(StructureKind::Storage).next()
    }

    /// Live worker count per role (roles without workers map to 0).
    pub fn role_counts(&self) -> BTreeMap<Role, u32> {
        let mut counts: BTreeMap<Role, u32> = Role::ALL.into_iter().map(|r| (r, 0)).collect();
        for worker in self.workers.values() {
            let entry = counts.entry(worker.role).or_insert(0);
            *entry = entry.saturating_add(1);
        }
        counts
    }
}
