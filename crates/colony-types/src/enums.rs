//! Enumeration types for the colony controller.
//!
//! Every piece of string-keyed dispatch the host exposes (roles, structure
//! kinds, event tags) is modelled as a closed enum here so that behavior is
//! driven by exhaustive matches and an unknown tag cannot be silently ignored.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The job a worker performs for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Gathers energy and keeps the spawn, extensions, and towers filled.
    Harvester,
    /// Gathers energy and feeds it into the controller.
    Upgrader,
    /// Gathers energy and turns it into structures and reinforcement.
    Builder,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 3] = [Self::Harvester, Self::Upgrader, Self::Builder];

    /// The fixed order in which under-staffed roles are produced.
    pub const SPAWN_PRIORITY: [Self; 3] = [Self::Harvester, Self::Builder, Self::Upgrader];

    /// Lowercase name used in worker names and event payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvester => "harvester",
            Self::Upgrader => "upgrader",
            Self::Builder => "builder",
        }
    }

    /// Parse the lowercase name produced by [`Role::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of the gather/deliver cycle a worker is in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskMode {
    /// Collecting energy from a source or storage.
    #[default]
    Gathering,
    /// Spending carried energy on the role's target.
    Delivering,
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// The kind of a built structure or construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum StructureKind {
    /// The production facility that turns energy into workers.
    Spawn,
    /// Extra energy capacity available to the spawn.
    Extension,
    /// Defense structure: attacks, repairs, and reinforces at range.
    Tower,
    /// Bulk energy storage.
    Storage,
    /// Protective overlay placed on top of another structure.
    Rampart,
    /// Standalone barrier.
    Wall,
    /// Traversal aid.
    Road,
    /// Small free-standing energy container.
    Container,
}

impl StructureKind {
    /// Structures that supply energy to the production facility.
    pub const fn is_production_sink(self) -> bool {
        matches!(self, Self::Spawn | Self::Extension)
    }

    /// Structures whose only purpose is to absorb damage.
    pub const fn is_barrier(self) -> bool {
        matches!(self, Self::Rampart | Self::Wall)
    }

    /// Critical structures that get a protective overlay.
    pub const fn needs_overlay(self) -> bool {
        matches!(self, Self::Spawn | Self::Tower)
    }
}

impl core::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Spawn => "spawn",
            Self::Extension => "extension",
            Self::Tower => "tower",
            Self::Storage => "storage",
            Self::Rampart => "rampart",
            Self::Wall => "wall",
            Self::Road => "road",
            Self::Container => "container",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Body parts
// ---------------------------------------------------------------------------

/// Ticks the production facility needs per body part.
pub const SPAWN_TICKS_PER_PART: u32 = 3;

/// One capability unit in a worker's loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BodyPart {
    /// Harvest, build, repair, and upgrade throughput.
    Work,
    /// Carry capacity (50 energy per part).
    Carry,
    /// Movement speed.
    Move,
}

impl BodyPart {
    /// Energy cost of producing this part.
    pub const fn cost(self) -> u32 {
        match self {
            Self::Work => 100,
            Self::Carry | Self::Move => 50,
        }
    }
}

/// Total energy cost of a loadout.
pub fn body_cost(body: &[BodyPart]) -> u32 {
    body.iter()
        .fold(0_u32, |acc, part| acc.saturating_add(part.cost()))
}

/// Ticks the production facility needs to produce a loadout.
pub fn spawn_duration(body: &[BodyPart]) -> u32 {
    u32::try_from(body.len())
        .unwrap_or(u32::MAX)
        .saturating_mul(SPAWN_TICKS_PER_PART)
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Passability of a single map cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Terrain {
    /// Normal ground.
    #[default]
    Plain,
    /// Passable but slow.
    Swamp,
    /// Impassable; nothing can be built here.
    Wall,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Notable condition surfaced to the external supervisor.
///
/// The serialized form is the upper-case tag used on the console wire
/// (`[EVENT:HOSTILE]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// Hostiles became visible.
    Hostile,
    /// The spawn or a tower started taking damage.
    SpawnAttacked,
    /// The production facility is gone.
    NoSpawn,
    /// The worker roster emptied.
    NoCreeps,
    /// Controller downgrade counter entered the most severe bucket.
    DowngradeCritical,
    /// Controller downgrade counter entered the middle bucket.
    DowngradeUrgent,
    /// Controller downgrade counter entered the least severe bucket.
    DowngradeWarning,
    /// No workers and not enough energy to produce one.
    LowEnergy,
    /// A worker lost hit points.
    CreepHurt,
    /// A worker disappeared from the roster.
    CreepDied,
    /// The controller level increased.
    RclUp,
    /// A tower finished construction.
    TowerBuilt,
    /// A storage finished construction.
    StorageBuilt,
    /// One or more extensions finished construction.
    ExtensionBuilt,
    /// A new worker joined the roster.
    SpawnComplete,
    /// Cumulative harvested energy crossed a milestone.
    EnergyMilestone,
    /// A worker exhausted its whole target fallback chain.
    NoViableTarget,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Hostile,
        Self::SpawnAttacked,
        Self::NoSpawn,
        Self::NoCreeps,
        Self::DowngradeCritical,
        Self::DowngradeUrgent,
        Self::DowngradeWarning,
        Self::LowEnergy,
        Self::CreepHurt,
        Self::CreepDied,
        Self::RclUp,
        Self::TowerBuilt,
        Self::StorageBuilt,
        Self::ExtensionBuilt,
        Self::SpawnComplete,
        Self::EnergyMilestone,
        Self::NoViableTarget,
    ];

    /// Upper-case wire tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Hostile => "HOSTILE",
            Self::SpawnAttacked => "SPAWN_ATTACKED",
            Self::NoSpawn => "NO_SPAWN",
            Self::NoCreeps => "NO_CREEPS",
            Self::DowngradeCritical => "DOWNGRADE_CRITICAL",
            Self::DowngradeUrgent => "DOWNGRADE_URGENT",
            Self::DowngradeWarning => "DOWNGRADE_WARNING",
            Self::LowEnergy => "LOW_ENERGY",
            Self::CreepHurt => "CREEP_HURT",
            Self::CreepDied => "CREEP_DIED",
            Self::RclUp => "RCL_UP",
            Self::TowerBuilt => "TOWER_BUILT",
            Self::StorageBuilt => "STORAGE_BUILT",
            Self::ExtensionBuilt => "EXTENSION_BUILT",
            Self::SpawnComplete => "SPAWN_COMPLETE",
            Self::EnergyMilestone => "ENERGY_MILESTONE",
            Self::NoViableTarget => "NO_VIABLE_TARGET",
        }
    }

    /// Look up an event type by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.tag() == tag)
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("miner"), None);
    }

    #[test]
    fn event_tags_roundtrip_and_match_serde() {
        for event in EventType::ALL {
            assert_eq!(EventType::from_tag(event.tag()), Some(event));
            let json = serde_json::to_string(&event).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", event.tag()));
        }
    }

    #[test]
    fn body_cost_and_duration() {
        let body = [BodyPart::Work, BodyPart::Carry, BodyPart::Move];
        assert_eq!(body_cost(&body), 200);
        assert_eq!(spawn_duration(&body), 9);
    }
}
