//! Production scheduling.
//!
//! Once per tick the scheduler decides whether the production facility
//! should start a new worker, which role it should be, and how big. The
//! facility runs at most one job, so the scheduler does nothing while a job
//! is active, and the tick-keyed guard in [`ColonyMemory`] stops a second
//! submission within the same tick.

use colony_agents::loadout;
use colony_types::{Action, ActionOutcome, Role, WorldSnapshot, body_cost, spawn_duration};
use colony_world::ActionSink;
use tracing::{debug, info, warn};

use crate::config::SpawnConfig;
use crate::memory::ColonyMemory;

/// How urgently the colony needs a worker, which sets how much energy the
/// scheduler waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTier {
    /// Too few harvesters: take the best body affordable right now.
    Emergency,
    /// Under total headcount: wait for a mid-size body.
    Recovery,
    /// At headcount, replacing an expiring worker: wait for the full body.
    Steady,
}

/// The role chosen for the next job and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePick {
    /// Role to produce.
    pub role: Role,
    /// `true` if the role is at target and is being replaced early.
    pub preemptive: bool,
}

/// Outcome of one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnDecision {
    /// There is no production facility.
    NoFacility,
    /// The facility is already producing.
    Busy,
    /// A job was already accepted this tick.
    AlreadySpawned,
    /// Every role is at target and nothing is about to expire.
    Staffed,
    /// A role was chosen but the energy is not there yet.
    Waiting {
        /// Role waiting to be produced.
        role: Role,
        /// Gating tier.
        tier: SpawnTier,
        /// Energy the chosen body costs.
        required: u32,
        /// Energy available now.
        available: u32,
    },
    /// The facility accepted a job.
    Spawned {
        /// Role of the new worker.
        role: Role,
        /// Gating tier.
        tier: SpawnTier,
        /// Name of the new worker.
        name: String,
        /// Energy spent.
        cost: u32,
    },
    /// The facility rejected the job. Memory is unchanged.
    Rejected {
        /// Role that was requested.
        role: Role,
        /// Host-supplied reason.
        reason: String,
    },
}

/// Pick the next role to produce, if any.
///
/// The first role below its headcount target wins, in spawn priority order.
/// Otherwise a role exactly at a non-zero target is re-selected when one of
/// its members will expire before a replacement could be produced twice over.
pub fn next_role(snapshot: &WorldSnapshot, config: &SpawnConfig) -> Option<RolePick> {
    let counts = snapshot.role_counts();
    let backlog = !snapshot.sites.is_empty();
    let headcount = config.headcount(snapshot.level());
    let count = |role: Role| counts.get(&role).copied().unwrap_or(0);

    let understaffed = Role::SPAWN_PRIORITY
        .into_iter()
        .find(|role| count(*role) < headcount.target(*role, backlog));
    if let Some(role) = understaffed {
        return Some(RolePick {
            role,
            preemptive: false,
        });
    }

    let budget = steady_budget(snapshot, config);
    Role::SPAWN_PRIORITY
        .into_iter()
        .filter(|role| {
            let target = headcount.target(*role, backlog);
            target > 0 && count(*role) == target
        })
        .find(|role| {
            let threshold = spawn_duration(&loadout(*role, budget))
                .saturating_mul(config.replacement_factor);
            snapshot.workers.values().any(|w| {
                w.role == *role && w.ticks_to_live.is_some_and(|ttl| ttl < threshold)
            })
        })
        .map(|role| RolePick {
            role,
            preemptive: true,
        })
}

/// The gating tier for the current roster.
pub fn tier(snapshot: &WorldSnapshot, config: &SpawnConfig) -> SpawnTier {
    let counts = snapshot.role_counts();
    let harvesters = counts.get(&Role::Harvester).copied().unwrap_or(0);
    if harvesters < config.emergency_harvesters {
        return SpawnTier::Emergency;
    }
    let backlog = !snapshot.sites.is_empty();
    let total_target = config.headcount(snapshot.level()).total(backlog);
    let live = u32::try_from(snapshot.workers.len()).unwrap_or(u32::MAX);
    if live < total_target {
        SpawnTier::Recovery
    } else {
        SpawnTier::Steady
    }
}

/// Energy budget the body is sized from in each tier.
pub fn tier_budget(snapshot: &WorldSnapshot, config: &SpawnConfig, tier: SpawnTier) -> u32 {
    match tier {
        SpawnTier::Emergency => snapshot.energy_available().min(config.max_loadout_cost),
        SpawnTier::Recovery => config
            .recovery_energy
            .min(snapshot.energy_capacity_available()),
        SpawnTier::Steady => steady_budget(snapshot, config),
    }
}

fn steady_budget(snapshot: &WorldSnapshot, config: &SpawnConfig) -> u32 {
    snapshot
        .energy_capacity_available()
        .min(config.max_loadout_cost)
}

/// Run one scheduling pass and submit at most one production job.
pub fn decide(
    snapshot: &WorldSnapshot,
    memory: &mut ColonyMemory,
    config: &SpawnConfig,
    sink: &mut dyn ActionSink,
) -> SpawnDecision {
    let tick = snapshot.tick;
    let Some(spawner) = &snapshot.spawner else {
        if memory.notice("no_facility", tick, config.notice_interval) {
            warn!(tick, "no production facility, spawning suspended");
        }
        return SpawnDecision::NoFacility;
    };
    if memory.spawned_at(tick) {
        return SpawnDecision::AlreadySpawned;
    }
    if spawner.is_busy() {
        return SpawnDecision::Busy;
    }

    let Some(pick) = next_role(snapshot, config) else {
        return SpawnDecision::Staffed;
    };
    let tier = tier(snapshot, config);
    let body = loadout(pick.role, tier_budget(snapshot, config, tier));
    let required = body_cost(&body);
    let available = snapshot.energy_available();
    if available < required {
        debug!(tick, role = %pick.role, ?tier, required, available, "waiting for energy");
        return SpawnDecision::Waiting {
            role: pick.role,
            tier,
            required,
            available,
        };
    }

    let name = format!("{}{tick}", pick.role);
    let action = Action::Spawn {
        spawner: spawner.structure_id,
        name: name.clone(),
        role: pick.role,
        body,
    };
    match sink.submit(action) {
        ActionOutcome::Accepted => {
            memory.last_spawn_tick = Some(tick);
            info!(
                tick,
                role = %pick.role,
                name = %name,
                ?tier,
                cost = required,
                preemptive = pick.preemptive,
                "production job accepted"
            );
            SpawnDecision::Spawned {
                role: pick.role,
                tier,
                name,
                cost: required,
            }
        }
        ActionOutcome::NotInRange => rejected(tick, pick.role, "not in range".to_owned()),
        ActionOutcome::Failed { reason } => rejected(tick, pick.role, reason),
    }
}

fn rejected(tick: u64, role: Role, reason: String) -> SpawnDecision {
    warn!(tick, %role, reason = %reason, "production job rejected");
    SpawnDecision::Rejected { role, reason }
}
