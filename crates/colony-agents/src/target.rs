//! Cached targets and the ordered selector chains that pick them.
//!
//! A worker never trusts a cached id. A [`CachedTarget`] pairs the id with
//! the predicate that selected it, and [`CachedTarget::resolve`] re-checks
//! both against the current snapshot: a target that vanished or stopped
//! satisfying its predicate is a cache miss and the worker re-selects.
//!
//! Delivery priorities are data, not nested conditionals. Each role has a
//! fixed chain of [`Selector`]s evaluated in order; the first selector that
//! returns a target wins. A fallback step only applies because nothing
//! above it did, so its pick is never cached: the chain runs again next
//! tick.

use colony_types::{
    Position, Role, SiteId, SourceId, StructureId, StructureKind, Worker, WorldSnapshot,
};
use colony_world::{WorldQuery, nearest_by_path};
use serde::{Deserialize, Serialize};

use crate::config::RoleConfig;

// ---------------------------------------------------------------------------
// Cached references
// ---------------------------------------------------------------------------

/// A weak reference to something a worker can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    /// A built structure.
    Structure(StructureId),
    /// A construction site.
    Site(SiteId),
    /// An energy source.
    Source(SourceId),
    /// The colony's controller.
    Controller,
}

/// The condition a target had to meet when it was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPredicate {
    /// The structure can still accept energy.
    HasFreeCapacity,
    /// The structure still holds energy.
    HasEnergy,
    /// The source still has energy to harvest.
    HasYield,
    /// The structure is still below this many hit points.
    BelowHits(u32),
    /// The target only has to exist.
    Exists,
}

/// A target reference plus the predicate that keeps it valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTarget {
    /// What the worker is acting on.
    pub target: TargetRef,
    /// The condition the target must still meet.
    pub predicate: TargetPredicate,
}

impl CachedTarget {
    /// Pair a reference with its validity predicate.
    pub const fn new(target: TargetRef, predicate: TargetPredicate) -> Self {
        Self { target, predicate }
    }

    /// Position of the target if it still exists and still satisfies the
    /// predicate; `None` is a cache miss.
    pub fn resolve(&self, snapshot: &WorldSnapshot) -> Option<Position> {
        match self.target {
            TargetRef::Structure(id) => {
                let structure = snapshot.structures.get(&id)?;
                let valid = match self.predicate {
                    TargetPredicate::HasFreeCapacity => structure.free_energy_capacity() > 0,
                    TargetPredicate::HasEnergy => structure.stored_energy() > 0,
                    TargetPredicate::BelowHits(floor) => structure.hits < floor,
                    TargetPredicate::Exists => true,
                    TargetPredicate::HasYield => false,
                };
                valid.then_some(structure.pos)
            }
            TargetRef::Site(id) => snapshot.sites.get(&id).map(|site| site.pos),
            TargetRef::Source(id) => {
                let source = snapshot.sources.get(&id)?;
                let valid = match self.predicate {
                    TargetPredicate::HasYield => source.energy > 0,
                    TargetPredicate::Exists => true,
                    _ => false,
                };
                valid.then_some(source.pos)
            }
            TargetRef::Controller => snapshot.controller.as_ref().map(|c| c.pos),
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Everything a selector may look at.
pub struct SelectionContext<'a> {
    /// Current world state.
    pub snapshot: &'a WorldSnapshot,
    /// Travel-cost oracle.
    pub world: &'a dyn WorldQuery,
    /// The worker choosing a target.
    pub worker: &'a Worker,
    /// Selection tunables.
    pub config: &'a RoleConfig,
}

/// One named step of a delivery chain.
#[derive(Clone, Copy)]
pub struct Selector {
    /// Short name used in logs and tests.
    pub label: &'static str,
    /// Returns a target when this step applies.
    pub select: fn(&SelectionContext<'_>) -> Option<CachedTarget>,
    /// Whether this step is a last resort behind higher selectors.
    pub fallback: bool,
}

/// The winning step of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Label of the selector that matched.
    pub label: &'static str,
    /// The chosen target.
    pub target: CachedTarget,
    /// The match came from a fallback step and must not be cached.
    pub fallback: bool,
}

impl core::fmt::Debug for Selector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Selector").field("label", &self.label).finish()
    }
}

/// Harvesters fill production, then towers, then storage, then upgrade.
pub const HARVESTER_CHAIN: &[Selector] = &[
    Selector {
        label: "production",
        select: fill_production,
        fallback: false,
    },
    Selector {
        label: "tower",
        select: fill_towers,
        fallback: false,
    },
    Selector {
        label: "storage",
        select: fill_storage,
        fallback: false,
    },
    Selector {
        label: "controller",
        select: controller,
        fallback: true,
    },
];

/// Upgraders only ever feed the controller.
pub const UPGRADER_CHAIN: &[Selector] = &[Selector {
    label: "controller",
    select: controller,
    fallback: false,
}];

/// Builders construct, then reinforce, then upgrade.
pub const BUILDER_CHAIN: &[Selector] = &[
    Selector {
        label: "construction",
        select: construction,
        fallback: false,
    },
    Selector {
        label: "reinforce",
        select: reinforcement,
        fallback: false,
    },
    Selector {
        label: "controller",
        select: controller,
        fallback: true,
    },
];

/// The delivery chain for a role.
pub const fn delivery_chain(role: Role) -> &'static [Selector] {
    match role {
        Role::Harvester => HARVESTER_CHAIN,
        Role::Upgrader => UPGRADER_CHAIN,
        Role::Builder => BUILDER_CHAIN,
    }
}

/// Evaluate `chain` in order and return the first match.
pub fn select_first(chain: &[Selector], ctx: &SelectionContext<'_>) -> Option<Selection> {
    chain.iter().find_map(|selector| {
        (selector.select)(ctx).map(|target| Selection {
            label: selector.label,
            target,
            fallback: selector.fallback,
        })
    })
}

/// Nearest source by travel cost that still has energy.
pub fn select_source(ctx: &SelectionContext<'_>) -> Option<SourceId> {
    nearest_by_path(
        ctx.world,
        ctx.worker.pos,
        ctx.snapshot.sources.values().filter(|s| s.energy > 0),
        |s| s.pos,
    )
    .map(|s| s.id)
}

fn nearest_with_room(
    ctx: &SelectionContext<'_>,
    wanted: fn(StructureKind) -> bool,
) -> Option<CachedTarget> {
    nearest_by_path(
        ctx.world,
        ctx.worker.pos,
        ctx.snapshot
            .structures
            .values()
            .filter(|s| wanted(s.kind) && s.free_energy_capacity() > 0),
        |s| s.pos,
    )
    .map(|s| {
        CachedTarget::new(
            TargetRef::Structure(s.id),
            TargetPredicate::HasFreeCapacity,
        )
    })
}

fn fill_production(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    nearest_with_room(ctx, StructureKind::is_production_sink)
}

fn fill_towers(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    nearest_with_room(ctx, |kind| kind == StructureKind::Tower)
}

fn fill_storage(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    nearest_with_room(ctx, |kind| kind == StructureKind::Storage)
}

fn controller(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    ctx.snapshot
        .controller
        .as_ref()
        .map(|_| CachedTarget::new(TargetRef::Controller, TargetPredicate::Exists))
}

/// Towers first, then extensions, then whatever was placed first.
fn construction(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    let sites = &ctx.snapshot.sites;
    sites
        .values()
        .find(|s| s.kind == StructureKind::Tower)
        .or_else(|| sites.values().find(|s| s.kind == StructureKind::Extension))
        .or_else(|| sites.values().next())
        .map(|s| CachedTarget::new(TargetRef::Site(s.id), TargetPredicate::Exists))
}

/// The globally weakest barrier below the floor, regardless of distance.
fn reinforcement(ctx: &SelectionContext<'_>) -> Option<CachedTarget> {
    let floor = ctx.config.reinforce_floor;
    ctx.snapshot
        .structures
        .values()
        .filter(|s| s.kind.is_barrier() && s.hits < floor)
        .min_by_key(|s| s.hits)
        .map(|s| {
            CachedTarget::new(
                TargetRef::Structure(s.id),
                TargetPredicate::BelowHits(floor),
            )
        })
}
