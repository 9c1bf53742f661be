//! The engine loop around the single-tick cycle.
//!
//! [`Engine::step`] runs one tick against the reference world: the decision
//! pass, escalation of the tick's events through the cooldown filter, random
//! hostile arrivals, and the world's own advance. [`Engine::run`] paces steps
//! on a fixed interval until the tick limit or an interrupt, persisting
//! memory and the pending-events file along the way.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use colony_core::{ColonyConfig, ColonyMemory, TickSummary, run_tick};
use colony_events::{EscalationPipeline, Ingested};
use colony_types::Position;
use colony_world::{GridWorld, MAP_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Hit points of a wandering hostile.
const HOSTILE_HITS: u32 = 1_000;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// The process received an interrupt.
    Interrupted,
}

/// Result of an engine run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Ticks executed in this run.
    pub total_ticks: u64,
    /// The last completed tick, if any.
    pub final_summary: Option<TickSummary>,
}

/// Everything the engine owns between ticks.
pub struct Engine {
    config: ColonyConfig,
    world: GridWorld,
    memory: ColonyMemory,
    pipeline: EscalationPipeline,
    rng: StdRng,
    memory_path: PathBuf,
    events_path: PathBuf,
}

impl Engine {
    /// Assemble an engine from loaded parts.
    pub fn new(
        config: ColonyConfig,
        world: GridWorld,
        memory: ColonyMemory,
        pipeline: EscalationPipeline,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.engine.seed);
        let memory_path = PathBuf::from(&config.engine.memory_path);
        let events_path = PathBuf::from(&config.engine.events_path);
        Self {
            config,
            world,
            memory,
            pipeline,
            rng,
            memory_path,
            events_path,
        }
    }

    /// The reference world.
    pub const fn world(&self) -> &GridWorld {
        &self.world
    }

    /// The colony memory.
    pub const fn memory(&self) -> &ColonyMemory {
        &self.memory
    }

    /// The escalation pipeline.
    pub const fn pipeline(&self) -> &EscalationPipeline {
        &self.pipeline
    }

    /// Run one tick and advance the world.
    ///
    /// The world's action history is drained every step so a long run does
    /// not accumulate it. Returns the tick summary and whether the escalation
    /// queue changed.
    pub fn step(&mut self) -> (TickSummary, bool) {
        self.maybe_add_hostile();

        let snapshot = self.world.snapshot().clone();
        let summary = run_tick(
            &snapshot,
            &mut self.world,
            &mut self.memory,
            &self.config,
            Utc::now(),
        );

        let mut queued = false;
        for record in summary.events.iter().cloned() {
            queued |= self.pipeline.ingest(record) == Ingested::Queued;
        }

        let history = self.world.take_history();
        let refused = history.iter().filter(|(_, outcome)| !outcome.is_accepted()).count();
        debug!(tick = summary.tick, submitted = history.len(), refused, "actions resolved");

        let report = self.world.advance();
        for id in &report.expired {
            info!(tick = summary.tick, worker = %id, "worker expired");
        }
        if let Some(id) = report.released {
            info!(tick = summary.tick, worker = %id, "worker released");
        }
        (summary, queued)
    }

    fn maybe_add_hostile(&mut self) {
        let chance = self.config.engine.hostile_chance;
        if !(0.0..=1.0).contains(&chance) || !self.rng.random_bool(chance) {
            return;
        }
        let edge = self.rng.random_range(0..MAP_SIZE);
        let pos = match self.rng.random_range(0..4_u8) {
            0 => Position::new(edge, 0),
            1 => Position::new(edge, MAP_SIZE.saturating_sub(1)),
            2 => Position::new(0, edge),
            _ => Position::new(MAP_SIZE.saturating_sub(1), edge),
        };
        let id = self.world.add_hostile(pos, HOSTILE_HITS, "Invader");
        warn!(tick = self.world.snapshot().tick, hostile = %id, %pos, "hostile arrived");
    }

    /// Write colony memory to its configured path.
    pub fn save_memory(&self) -> Result<(), EngineError> {
        self.memory.save(&self.memory_path)?;
        Ok(())
    }

    /// Write the escalation queue to its configured path.
    pub fn save_events(&self) -> Result<(), EngineError> {
        self.pipeline.queue().save(&self.events_path)?;
        Ok(())
    }

    /// Drive ticks on the configured interval until the tick limit or an
    /// interrupt.
    pub async fn run(&mut self) -> Result<RunResult, EngineError> {
        let engine = &self.config.engine;
        let max_ticks = engine.max_ticks;
        let persist_interval = engine.persist_interval;
        let mut interval =
            tokio::time::interval(Duration::from_millis(engine.tick_interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_interval_ms = engine.tick_interval_ms,
            max_ticks = ?max_ticks,
            start_tick = self.world.snapshot().tick,
            "Tick loop starting"
        );

        let mut total_ticks: u64 = 0;
        let mut final_summary = None;
        let end_reason = loop {
            if max_ticks.is_some_and(|max| total_ticks >= max) {
                break EndReason::MaxTicksReached;
            }
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => break EndReason::Interrupted,
            }

            let (summary, queued) = self.step();
            total_ticks = total_ticks.saturating_add(1);
            if queued {
                self.save_events()?;
            }
            if summary.tick.checked_rem(persist_interval) == Some(0) {
                self.save_memory()?;
            }
            final_summary = Some(summary);
        };

        self.save_memory()?;
        self.save_events()?;
        info!(
            reason = ?end_reason,
            total_ticks,
            final_tick = final_summary.as_ref().map(|s| s.tick),
            pending_events = self.pipeline.queue().len(),
            "Tick loop ended"
        );
        Ok(RunResult {
            end_reason,
            total_ticks,
            final_summary,
        })
    }
}
