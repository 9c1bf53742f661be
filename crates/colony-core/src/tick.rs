//! Tick cycle: one full decision pass over a world snapshot.
//!
//! Each tick runs these phases in a fixed order:
//!
//! 1. **Prune** -- drop memory for workers that are gone.
//! 2. **Detect** -- run the edge-triggered event detectors and write each
//!    detection to the console feed.
//! 3. **Spawn** -- let the scheduler start at most one production job.
//! 4. **Build** -- on the planning interval, place construction sites.
//! 5. **Workers** -- run every worker's state machine until the soft compute
//!    budget is spent. The starting worker rotates with the tick so a tight
//!    budget does not starve the same workers every tick.
//! 6. **Towers** -- attack, repair, or reinforce.
//! 7. **Status** -- on the status interval, emit the status line.
//!
//! Components share one [`ColonyMemory`] and mutate it in place. Nothing in
//! it relies on a pass having completed, so a tick cut short by the host is
//! picked up cleanly by the next one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colony_agents::{RoleContext, WorkerTurn, run_worker};
use colony_events::{Detection, EscalationPipeline, detect};
use colony_types::{AgentId, EventRecord, EventType, Role, StructureId, WorldSnapshot};
use colony_world::Host;
use tracing::{debug, info, warn};

use crate::build::{self, BuildReport};
use crate::config::ColonyConfig;
use crate::defense::{self, TowerAction};
use crate::memory::ColonyMemory;
use crate::spawn::{self, SpawnDecision};

/// Summary of a completed tick, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick that was processed.
    pub tick: u64,
    /// Workers whose memory was pruned, with their last known roles.
    pub pruned: Vec<(AgentId, Role)>,
    /// Events raised this tick, in detection order.
    pub events: Vec<EventRecord>,
    /// What the production scheduler did.
    pub spawn: SpawnDecision,
    /// Planning result, on ticks where the planner ran.
    pub build: Option<BuildReport>,
    /// How each processed worker's turn ended.
    pub turns: BTreeMap<AgentId, WorkerTurn>,
    /// Workers skipped because the compute budget ran out.
    pub skipped_workers: u32,
    /// What each tower chose.
    pub towers: Vec<(StructureId, TowerAction)>,
    /// The status line, on ticks where it was emitted.
    pub status: Option<StatusLine>,
}

/// The periodic one-line colony summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Compute used so far this tick.
    pub cpu_used: f64,
    /// Compute limit shown for reference.
    pub cpu_limit: f64,
    /// Live workers.
    pub creeps: usize,
    /// Authority level.
    pub level: u8,
    /// Progress toward the next level.
    pub progress: u64,
    /// Progress needed for the next level.
    pub progress_total: u64,
}

impl StatusLine {
    /// Capture the status line for `snapshot`.
    pub fn capture(snapshot: &WorldSnapshot, cpu_used: f64, cpu_limit: f64) -> Self {
        let (progress, progress_total) = snapshot
            .controller
            .as_ref()
            .map_or((0, 0), |c| (c.progress, c.progress_total));
        Self {
            cpu_used,
            cpu_limit,
            creeps: snapshot.workers.len(),
            level: snapshot.level(),
            progress,
            progress_total,
        }
    }
}

impl core::fmt::Display for StatusLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[CPU] {:.1}/{:.0} | Creeps: {} | Level: {} | Progress: {}/{}",
            self.cpu_used, self.cpu_limit, self.creeps, self.level, self.progress, self.progress_total
        )
    }
}

fn on_interval(tick: u64, interval: u64) -> bool {
    tick.checked_rem(interval) == Some(0)
}

/// Index of the first worker processed on `tick`.
fn rotation(tick: u64, workers: usize) -> usize {
    u64::try_from(workers)
        .ok()
        .and_then(|n| tick.checked_rem(n))
        .and_then(|r| usize::try_from(r).ok())
        .unwrap_or(0)
}

/// Execute one tick against `snapshot`, acting through `host`.
///
/// `snapshot` is the world as it stood at the start of the tick; actions
/// submitted during the tick show up in the next one. `now` stamps the
/// event records.
pub fn run_tick(
    snapshot: &WorldSnapshot,
    host: &mut dyn Host,
    memory: &mut ColonyMemory,
    config: &ColonyConfig,
    now: DateTime<Utc>,
) -> TickSummary {
    let tick = snapshot.tick;
    debug!(tick, workers = snapshot.workers.len(), "tick started");

    // --- Phase 1: Prune ---
    let pruned = memory.prune(snapshot);
    for (id, role) in &pruned {
        debug!(tick, worker = %id, %role, "pruned worker memory");
    }

    // --- Phase 2: Detect ---
    let mut events: Vec<EventRecord> = detect(snapshot, &mut memory.observations, &config.events)
        .into_iter()
        .map(|detection| EscalationPipeline::record(detection, tick, now))
        .collect();
    for record in &events {
        info!(target: "colony::events", "{}", record.raw);
    }

    // --- Phase 3: Spawn ---
    let spawn = spawn::decide(snapshot, memory, &config.spawn, host);

    // --- Phase 4: Build ---
    let build = on_interval(tick, config.build.interval)
        .then(|| build::plan(snapshot, host, &config.build));

    // --- Phase 5: Workers ---
    let ctx = RoleContext {
        snapshot,
        config: &config.roles,
    };
    let mut turns = BTreeMap::new();
    let mut skipped_workers: u32 = 0;
    let start = rotation(tick, snapshot.workers.len());
    let rotated = snapshot
        .workers
        .values()
        .skip(start)
        .chain(snapshot.workers.values().take(start));
    for worker in rotated {
        if worker.ticks_to_live.is_none() {
            continue;
        }
        if host.cpu_used() >= config.budget.worker_cpu_limit {
            skipped_workers = skipped_workers.saturating_add(1);
            continue;
        }
        let turn = run_worker(worker, memory.workers.entry(worker), &ctx, host);
        if turn == WorkerTurn::NoViableTarget {
            let detection = Detection {
                event_type: EventType::NoViableTarget,
                value: Some(format!("{}:{}", worker.role, worker.name)),
            };
            let record = EscalationPipeline::record(detection, tick, now);
            info!(target: "colony::events", "{}", record.raw);
            events.push(record);
        }
        turns.insert(worker.id, turn);
    }
    if skipped_workers > 0 {
        warn!(
            tick,
            skipped = skipped_workers,
            cpu = host.cpu_used(),
            "compute budget spent, workers skipped"
        );
    }

    // --- Phase 6: Towers ---
    let towers = defense::run_towers(snapshot, host, &config.defense);

    // --- Phase 7: Status ---
    let status = on_interval(tick, config.status.interval).then(|| {
        let line = StatusLine::capture(snapshot, host.cpu_used(), config.status.cpu_limit);
        info!(tick, "{line}");
        line
    });

    debug!(
        tick,
        events = events.len(),
        acted = turns.len(),
        skipped = skipped_workers,
        "tick complete"
    );

    TickSummary {
        tick,
        pruned,
        events,
        spawn,
        build,
        turns,
        skipped_workers,
        towers,
        status,
    }
}

#[cfg(test)]
mod tests {
    use colony_types::{Action, ActionOutcome, Controller, EnergyStore, Position, Worker};
    use colony_world::{ActionLog, ActionSink, SplitHost, WorldQuery};

    use super::*;

    struct Meter {
        cpu: f64,
    }

    impl WorldQuery for Meter {
        fn path_cost(&self, from: Position, to: Position) -> Option<u32> {
            Some(from.range_to(to))
        }

        fn terrain(&self, _pos: Position) -> colony_types::Terrain {
            colony_types::Terrain::Plain
        }

        fn cpu_used(&self) -> f64 {
            self.cpu
        }
    }

    fn colony() -> WorldSnapshot {
        let mut snapshot = WorldSnapshot {
            tick: 100,
            controller: Some(Controller {
                pos: Position::new(25, 10),
                level: 2,
                progress: 1234,
                progress_total: 45_000,
                ticks_to_downgrade: 10_000,
            }),
            ..WorldSnapshot::default()
        };
        for role in [Role::Upgrader, Role::Builder] {
            let w = Worker {
                id: AgentId::new(),
                name: format!("{role}7"),
                role,
                pos: Position::new(25, 12),
                store: EnergyStore::new(50, 50),
                hits: 300,
                hits_max: 300,
                ticks_to_live: Some(1000),
                body: Vec::new(),
            };
            snapshot.workers.insert(w.id, w);
        }
        snapshot
    }

    #[test]
    fn status_line_format() {
        let line = StatusLine {
            cpu_used: 3.456,
            cpu_limit: 20.0,
            creeps: 7,
            level: 3,
            progress: 1200,
            progress_total: 135_000,
        };
        assert_eq!(
            line.to_string(),
            "[CPU] 3.5/20 | Creeps: 7 | Level: 3 | Progress: 1200/135000"
        );
    }

    #[test]
    fn phases_run_and_status_is_periodic() {
        let snapshot = colony();
        let meter = Meter { cpu: 1.0 };
        let mut log = ActionLog::new();
        let mut host = SplitHost {
            query: &meter,
            sink: &mut log,
        };
        let mut memory = ColonyMemory::new();
        let config = ColonyConfig::default();

        let summary = run_tick(&snapshot, &mut host, &mut memory, &config, Utc::now());

        assert_eq!(summary.turns.len(), 2);
        assert!(summary.turns.values().all(|t| *t == WorkerTurn::Acted));
        assert_eq!(summary.spawn, SpawnDecision::NoFacility);
        assert!(summary.build.is_some());
        let status = summary.status.as_ref().map(ToString::to_string);
        assert_eq!(
            status.as_deref(),
            Some("[CPU] 1.0/20 | Creeps: 2 | Level: 2 | Progress: 1234/45000")
        );
        assert_eq!(memory.workers.len(), 2);

        let mut later = snapshot;
        later.tick = 101;
        let summary = run_tick(&later, &mut host, &mut memory, &config, Utc::now());
        assert!(summary.status.is_none());
        assert!(summary.build.is_none());
    }

    #[test]
    fn exhausted_budget_skips_workers() {
        let snapshot = colony();
        let meter = Meter { cpu: 19.0 };
        let mut log = ActionLog::new();
        let mut host = SplitHost {
            query: &meter,
            sink: &mut log,
        };
        let mut memory = ColonyMemory::new();
        let summary = run_tick(
            &snapshot,
            &mut host,
            &mut memory,
            &ColonyConfig::default(),
            Utc::now(),
        );
        assert!(summary.turns.is_empty());
        assert_eq!(summary.skipped_workers, 2);
        assert!(memory.workers.is_empty());
    }

    /// Charges one unit of compute per submitted action.
    #[derive(Default)]
    struct Metered {
        cpu: f64,
    }

    impl WorldQuery for Metered {
        fn path_cost(&self, from: Position, to: Position) -> Option<u32> {
            Some(from.range_to(to))
        }

        fn terrain(&self, _pos: Position) -> colony_types::Terrain {
            colony_types::Terrain::Plain
        }

        fn cpu_used(&self) -> f64 {
            self.cpu
        }
    }

    impl ActionSink for Metered {
        fn submit(&mut self, _action: Action) -> ActionOutcome {
            self.cpu += 1.0;
            ActionOutcome::Accepted
        }
    }

    #[test]
    fn tight_budget_rotates_which_workers_run() {
        let mut snapshot = colony();
        let mut config = ColonyConfig::default();
        config.budget.worker_cpu_limit = 1.0;
        let mut memory = ColonyMemory::new();

        let mut served = std::collections::BTreeSet::new();
        for tick in 100..102 {
            snapshot.tick = tick;
            let mut host = Metered::default();
            let summary = run_tick(&snapshot, &mut host, &mut memory, &config, Utc::now());
            assert_eq!(summary.skipped_workers, 1);
            served.extend(summary.turns.keys().copied());
        }
        assert_eq!(served.len(), 2);
    }

    #[test]
    fn missing_controller_raises_no_viable_target() {
        let mut snapshot = colony();
        snapshot.controller = None;
        let meter = Meter { cpu: 0.0 };
        let mut log = ActionLog::new();
        let mut host = SplitHost {
            query: &meter,
            sink: &mut log,
        };
        let mut memory = ColonyMemory::new();
        let summary = run_tick(
            &snapshot,
            &mut host,
            &mut memory,
            &ColonyConfig::default(),
            Utc::now(),
        );
        let stranded: Vec<&EventRecord> = summary
            .events
            .iter()
            .filter(|e| e.event_type == EventType::NoViableTarget)
            .collect();
        assert_eq!(stranded.len(), 2);
        assert!(stranded.iter().all(|e| e.priority == 2));
        assert!(
            stranded
                .iter()
                .any(|e| e.raw.starts_with("[EVENT:NO_VIABLE_TARGET:upgrader:"))
        );
    }

    #[test]
    fn departed_workers_are_pruned_next_tick() {
        let mut snapshot = colony();
        let meter = Meter { cpu: 0.0 };
        let mut log = ActionLog::new();
        let mut host = SplitHost {
            query: &meter,
            sink: &mut log,
        };
        let mut memory = ColonyMemory::new();
        let config = ColonyConfig::default();
        run_tick(&snapshot, &mut host, &mut memory, &config, Utc::now());

        let gone = snapshot
            .workers
            .values()
            .find(|w| w.role == Role::Builder)
            .map(|w| w.id);
        snapshot.workers.retain(|_, w| w.role != Role::Builder);
        snapshot.tick = 101;
        let summary = run_tick(&snapshot, &mut host, &mut memory, &config, Utc::now());

        let died: Vec<&EventRecord> = summary
            .events
            .iter()
            .filter(|e| e.event_type == EventType::CreepDied)
            .collect();
        assert_eq!(died.len(), 1);
        assert_eq!(died.first().and_then(|e| e.value.as_deref()), Some("builder:builder7"));
        assert_eq!(summary.pruned.len(), 1);
        assert_eq!(summary.pruned.first().map(|(id, _)| *id), gone);
        assert_eq!(memory.workers.len(), 1);
    }
}
