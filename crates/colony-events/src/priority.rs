//! Severity lookup.
//!
//! Higher is more urgent. Worker damage and deaths are ranked by the role
//! of the worker involved: losing a harvester threatens the whole energy
//! economy, losing anyone else does not.

use colony_types::{EventType, Role};

/// Priority of `event`, optionally refined by the role it concerns.
pub const fn priority(event: EventType, role: Option<Role>) -> u8 {
    match (event, role) {
        (EventType::Hostile | EventType::SpawnAttacked | EventType::NoSpawn, _) => 10,
        (EventType::NoCreeps | EventType::DowngradeCritical, _) => 9,
        (EventType::LowEnergy, _) | (EventType::CreepHurt, Some(Role::Harvester)) => 8,
        (EventType::DowngradeUrgent, _) | (EventType::CreepDied, Some(Role::Harvester)) => 7,
        (EventType::CreepHurt | EventType::CreepDied, _) => 6,
        (EventType::RclUp | EventType::DowngradeWarning, _) => 5,
        (EventType::TowerBuilt | EventType::StorageBuilt, _) => 4,
        (EventType::ExtensionBuilt, _) => 3,
        (EventType::SpawnComplete | EventType::NoViableTarget, _) => 2,
        (EventType::EnergyMilestone, _) => 1,
    }
}

/// Priority of `event` given its wire payload.
///
/// Worker events carry `<role>:<name>`; the role prefix selects the
/// role-specific priority.
pub fn priority_for_payload(event: EventType, payload: Option<&str>) -> u8 {
    let role = payload
        .and_then(|p| p.split(':').next())
        .and_then(Role::parse);
    priority(event, role)
}
