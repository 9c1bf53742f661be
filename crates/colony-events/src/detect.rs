//! Edge-triggered detectors.
//!
//! Each detector compares one condition in the current snapshot against
//! the value persisted in [`Observations`] and fires only on the
//! transition into the notable state. Holding a condition fires nothing.
//!
//! The first call establishes a baseline: roster, hit points, structure
//! counts, level, and milestones are recorded silently. Boolean conditions
//! (hostiles, starvation, decay) are compared against their defaults, so a
//! colony that starts under threat still reports it.

use std::collections::BTreeMap;

use colony_types::{AgentId, EventType, Role, StructureId, StructureKind, WorldSnapshot};
use serde::{Deserialize, Serialize};

use crate::config::EventConfig;

/// Structure kinds whose completion is reported.
const MILESTONE_KINDS: [(StructureKind, EventType); 3] = [
    (StructureKind::Extension, EventType::ExtensionBuilt),
    (StructureKind::Tower, EventType::TowerBuilt),
    (StructureKind::Storage, EventType::StorageBuilt),
];

/// Severity of the controller downgrade counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DecayBucket {
    /// Below the warning threshold.
    Warning,
    /// Below the urgent threshold.
    Urgent,
    /// Below the critical threshold.
    Critical,
}

impl DecayBucket {
    /// Bucket for a downgrade counter, `None` at or above the warning line.
    pub const fn classify(ticks_to_downgrade: u32, config: &EventConfig) -> Option<Self> {
        if ticks_to_downgrade < config.decay_critical {
            Some(Self::Critical)
        } else if ticks_to_downgrade < config.decay_urgent {
            Some(Self::Urgent)
        } else if ticks_to_downgrade < config.decay_warning {
            Some(Self::Warning)
        } else {
            None
        }
    }

    /// The event raised on entering this bucket.
    pub const fn event(self) -> EventType {
        match self {
            Self::Warning => EventType::DowngradeWarning,
            Self::Urgent => EventType::DowngradeUrgent,
            Self::Critical => EventType::DowngradeCritical,
        }
    }
}

/// Last known identity and health of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Worker name.
    pub name: String,
    /// Worker role.
    pub role: Role,
    /// Hit points when last seen.
    pub hits: u32,
}

impl RosterEntry {
    /// The `<role>:<name>` payload used by worker events.
    pub fn payload(&self) -> String {
        format!("{}:{}", self.role, self.name)
    }
}

/// Everything the detectors remember between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observations {
    /// Whether a baseline has been recorded.
    pub initialized: bool,
    /// Workers seen last tick.
    pub roster: BTreeMap<AgentId, RosterEntry>,
    /// Hit points of spawns and towers last tick.
    pub critical_hits: BTreeMap<StructureId, u32>,
    /// Structure counts at the last sample.
    pub structure_counts: BTreeMap<StructureKind, u32>,
    /// Most severe downgrade bucket entered since the last recovery.
    pub decay_bucket: Option<DecayBucket>,
    /// Whether hostiles were visible last tick.
    pub hostiles_visible: bool,
    /// Whether the current attack episode has already been reported.
    pub under_attack: bool,
    /// Controller level last tick.
    pub level: u8,
    /// Whether a production facility existed last tick.
    pub had_spawner: bool,
    /// Whether the colony was starving last tick.
    pub starving: bool,
    /// Number of energy milestones already reported.
    pub milestones_reached: usize,
}

/// One detector firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// What fired.
    pub event_type: EventType,
    /// Optional payload.
    pub value: Option<String>,
}

impl Detection {
    fn new(event_type: EventType, value: Option<String>) -> Self {
        Self { event_type, value }
    }
}

/// Run every detector against `snapshot`, updating `obs`.
pub fn detect(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    config: &EventConfig,
) -> Vec<Detection> {
    let baseline = !obs.initialized;
    let mut out = Vec::new();

    detect_hostiles(snapshot, obs, &mut out);
    detect_spawn_attacked(snapshot, obs, &mut out);
    detect_no_spawn(snapshot, obs, &mut out);
    detect_level(snapshot, obs, baseline, &mut out);
    detect_decay(snapshot, obs, config, &mut out);
    detect_roster(snapshot, obs, baseline, &mut out);
    detect_starvation(snapshot, obs, config, &mut out);
    if baseline || on_interval(snapshot.tick, config.structure_sample_interval) {
        detect_structures(snapshot, obs, baseline, &mut out);
    }
    if baseline || on_interval(snapshot.tick, config.milestone_interval) {
        detect_milestones(snapshot, obs, config, baseline, &mut out);
    }

    obs.initialized = true;
    out
}

fn on_interval(tick: u64, interval: u64) -> bool {
    tick.checked_rem(interval) == Some(0)
}

fn detect_hostiles(snapshot: &WorldSnapshot, obs: &mut Observations, out: &mut Vec<Detection>) {
    let visible = !snapshot.hostiles.is_empty();
    if visible && !obs.hostiles_visible {
        out.push(Detection::new(
            EventType::Hostile,
            Some(snapshot.hostiles.len().to_string()),
        ));
    }
    obs.hostiles_visible = visible;
}

/// One event per attack episode; the episode ends once no hostile is
/// visible and nothing critical lost hit points this tick.
fn detect_spawn_attacked(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    out: &mut Vec<Detection>,
) {
    let current: BTreeMap<StructureId, u32> = snapshot
        .structures
        .values()
        .filter(|s| s.kind.needs_overlay())
        .map(|s| (s.id, s.hits))
        .collect();
    let damaged = snapshot.structures.values().find(|s| {
        obs.critical_hits
            .get(&s.id)
            .is_some_and(|&before| s.hits < before)
    });

    if let Some(structure) = damaged {
        if !obs.under_attack {
            out.push(Detection::new(
                EventType::SpawnAttacked,
                Some(structure.kind.to_string()),
            ));
        }
        obs.under_attack = true;
    } else if snapshot.hostiles.is_empty() {
        obs.under_attack = false;
    }
    obs.critical_hits = current;
}

fn detect_no_spawn(snapshot: &WorldSnapshot, obs: &mut Observations, out: &mut Vec<Detection>) {
    let present = snapshot.spawner.is_some();
    if obs.had_spawner && !present {
        out.push(Detection::new(EventType::NoSpawn, None));
    }
    obs.had_spawner = present;
}

fn detect_level(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    baseline: bool,
    out: &mut Vec<Detection>,
) {
    let level = snapshot.level();
    if !baseline && level > obs.level {
        out.push(Detection::new(EventType::RclUp, Some(level.to_string())));
    }
    obs.level = level;
}

/// Fires only when entering a more severe bucket; resets once the counter
/// is back at or above the warning threshold.
fn detect_decay(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    config: &EventConfig,
    out: &mut Vec<Detection>,
) {
    let Some(controller) = &snapshot.controller else {
        return;
    };
    let ticks = controller.ticks_to_downgrade;
    match DecayBucket::classify(ticks, config) {
        None => obs.decay_bucket = None,
        Some(bucket) if obs.decay_bucket.is_none_or(|seen| bucket > seen) => {
            out.push(Detection::new(bucket.event(), Some(ticks.to_string())));
            obs.decay_bucket = Some(bucket);
        }
        Some(_) => {}
    }
}

fn detect_roster(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    baseline: bool,
    out: &mut Vec<Detection>,
) {
    let current: BTreeMap<AgentId, RosterEntry> = snapshot
        .workers
        .values()
        .map(|w| {
            (
                w.id,
                RosterEntry {
                    name: w.name.clone(),
                    role: w.role,
                    hits: w.hits,
                },
            )
        })
        .collect();

    for (id, before) in &obs.roster {
        match current.get(id) {
            None => out.push(Detection::new(EventType::CreepDied, Some(before.payload()))),
            Some(now) if now.hits < before.hits => {
                out.push(Detection::new(EventType::CreepHurt, Some(now.payload())));
            }
            Some(_) => {}
        }
    }
    if !baseline {
        for (id, entry) in &current {
            if !obs.roster.contains_key(id) {
                out.push(Detection::new(
                    EventType::SpawnComplete,
                    Some(entry.payload()),
                ));
            }
        }
    }
    if !obs.roster.is_empty() && current.is_empty() {
        out.push(Detection::new(EventType::NoCreeps, None));
    }
    obs.roster = current;
}

fn detect_starvation(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    config: &EventConfig,
    out: &mut Vec<Detection>,
) {
    let energy = snapshot.energy_available();
    let starving = snapshot.workers.is_empty() && energy < config.low_energy_threshold;
    if starving && !obs.starving {
        out.push(Detection::new(EventType::LowEnergy, Some(energy.to_string())));
    }
    obs.starving = starving;
}

fn detect_structures(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    baseline: bool,
    out: &mut Vec<Detection>,
) {
    for (kind, event) in MILESTONE_KINDS {
        let count = snapshot.count_structures(kind);
        let before = obs.structure_counts.insert(kind, count).unwrap_or(0);
        if !baseline && count > before {
            out.push(Detection::new(event, Some(count.to_string())));
        }
    }
}

fn detect_milestones(
    snapshot: &WorldSnapshot,
    obs: &mut Observations,
    config: &EventConfig,
    baseline: bool,
    out: &mut Vec<Detection>,
) {
    let harvested = snapshot.energy_harvested;
    let crossed: Vec<u64> = config
        .milestones
        .iter()
        .copied()
        .filter(|&m| harvested >= m)
        .collect();
    if !baseline
        && crossed.len() > obs.milestones_reached
        && let Some(highest) = crossed.iter().max()
    {
        out.push(Detection::new(
            EventType::EnergyMilestone,
            Some(highest.to_string()),
        ));
    }
    obs.milestones_reached = obs.milestones_reached.max(crossed.len());
}
