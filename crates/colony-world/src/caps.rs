//! Per-level structure limits, build costs, and fresh-structure templates.
//!
//! These mirror the host's tables: how many of each structure the
//! controller level allows, how much progress a site needs, how long the
//! controller holds a level without upgrades, and what a freshly completed
//! structure looks like.

use colony_types::{EnergyStore, Position, Structure, StructureId, StructureKind};

/// Extensions allowed at levels 0 through 8.
const EXTENSION_CAPS: [u32; 9] = [0, 0, 5, 10, 20, 30, 40, 50, 60];

/// Towers allowed at levels 0 through 8.
const TOWER_CAPS: [u32; 9] = [0, 0, 0, 1, 1, 2, 2, 3, 6];

/// Spawns allowed at levels 0 through 8.
const SPAWN_CAPS: [u32; 9] = [0, 1, 1, 1, 1, 1, 1, 2, 3];

/// Ticks without an upgrade before each level decays (index = level).
const DOWNGRADE_TICKS: [u32; 9] = [0, 20_000, 10_000, 20_000, 40_000, 80_000, 120_000, 150_000, 200_000];

/// Progress needed to leave each level (index = level). Level 8 is final.
const PROGRESS_TOTALS: [u64; 9] = [0, 200, 45_000, 135_000, 405_000, 1_215_000, 3_645_000, 10_935_000, 0];

/// Highest controller level.
pub const MAX_LEVEL: u8 = 8;

/// Maximum number of `kind` structures the given level allows.
pub fn max_structures(kind: StructureKind, level: u8) -> u32 {
    let idx = usize::from(level.min(MAX_LEVEL));
    match kind {
        StructureKind::Extension => EXTENSION_CAPS.get(idx).copied().unwrap_or(0),
        StructureKind::Tower => TOWER_CAPS.get(idx).copied().unwrap_or(0),
        StructureKind::Spawn => SPAWN_CAPS.get(idx).copied().unwrap_or(0),
        StructureKind::Storage => u32::from(level >= 4),
        StructureKind::Rampart | StructureKind::Wall => {
            if level >= 2 {
                2500
            } else {
                0
            }
        }
        StructureKind::Road => 2500,
        StructureKind::Container => 5,
    }
}

/// Ticks the controller holds `level` without an upgrade contribution.
pub fn downgrade_ticks(level: u8) -> u32 {
    DOWNGRADE_TICKS
        .get(usize::from(level.min(MAX_LEVEL)))
        .copied()
        .unwrap_or(0)
}

/// Progress required to advance past `level` (0 at the final level).
pub fn progress_total(level: u8) -> u64 {
    PROGRESS_TOTALS
        .get(usize::from(level.min(MAX_LEVEL)))
        .copied()
        .unwrap_or(0)
}

/// Build progress a construction site of `kind` needs.
pub const fn build_cost(kind: StructureKind) -> u32 {
    match kind {
        StructureKind::Spawn => 15_000,
        StructureKind::Extension => 3_000,
        StructureKind::Tower | StructureKind::Container => 5_000,
        StructureKind::Storage => 30_000,
        StructureKind::Rampart | StructureKind::Wall => 1,
        StructureKind::Road => 300,
    }
}

/// A freshly completed structure of `kind` at `pos`.
///
/// Barriers start at 1 hit point and have to be reinforced up.
pub fn new_structure(kind: StructureKind, pos: Position) -> Structure {
    let (hits, hits_max, store) = match kind {
        StructureKind::Spawn => (5_000, 5_000, Some(EnergyStore::new(0, 300))),
        StructureKind::Extension => (1_000, 1_000, Some(EnergyStore::new(0, 50))),
        StructureKind::Tower => (3_000, 3_000, Some(EnergyStore::new(0, 1_000))),
        StructureKind::Storage => (10_000, 10_000, Some(EnergyStore::new(0, 1_000_000))),
        StructureKind::Rampart => (1, 300_000, None),
        StructureKind::Wall => (1, 300_000_000, None),
        StructureKind::Road => (5_000, 5_000, None),
        StructureKind::Container => (250_000, 250_000, Some(EnergyStore::new(0, 2_000))),
    };
    Structure {
        id: StructureId::new(),
        kind,
        pos,
        hits,
        hits_max,
        store,
    }
}
