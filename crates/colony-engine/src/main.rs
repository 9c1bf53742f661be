//! Colony controller binary.
//!
//! Wires the tick cycle to the in-memory reference world, restores
//! persisted memory and pending escalations, and runs the tick loop until
//! the tick limit or an interrupt.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `COLONY_CONFIG` or `colony-config.yaml`
//! 3. Build the world from the configured scenario or the starter layout
//! 4. Restore colony memory and the pending-events queue
//! 5. Run the tick loop
//! 6. Log the result

mod error;
mod runner;

use std::path::{Path, PathBuf};

use colony_core::{ColonyConfig, ColonyMemory};
use colony_events::EscalationPipeline;
use colony_world::GridWorld;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::runner::Engine;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "colony-config.yaml";

/// Application entry point for the colony engine.
///
/// # Errors
///
/// Returns an error if configuration, world loading, or persistence fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("colony-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        tick_interval_ms = config.engine.tick_interval_ms,
        max_ticks = ?config.engine.max_ticks,
        seed = config.engine.seed,
        "Configuration loaded"
    );

    // 3. Build the world.
    let world = match config.engine.scenario.as_deref() {
        Some(path) => {
            info!(scenario = path, "Loading scenario");
            GridWorld::load(Path::new(path))?
        }
        None => GridWorld::starter(),
    };
    info!(
        tick = world.snapshot().tick,
        level = world.snapshot().level(),
        workers = world.snapshot().workers.len(),
        "World ready"
    );

    // 4. Restore memory and pending escalations.
    let memory = ColonyMemory::load(Path::new(&config.engine.memory_path))?;
    let mut pipeline = EscalationPipeline::new(&config.events);
    pipeline
        .queue_mut()
        .load(Path::new(&config.engine.events_path))?;
    info!(
        tracked_workers = memory.workers.len(),
        pending_events = pipeline.queue().len(),
        "Memory restored"
    );

    // 5. Run the tick loop.
    let mut engine = Engine::new(config, world, memory, pipeline);
    let result = engine.run().await?;

    // 6. Log results.
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        world_tick = engine.world().snapshot().tick,
        tracked_workers = engine.memory().workers.len(),
        pending_events = engine.pipeline().queue().len(),
        "colony-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `COLONY_CONFIG`, then the default path, then
/// built-in defaults.
fn load_config() -> Result<ColonyConfig, EngineError> {
    let path = std::env::var_os("COLONY_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = ColonyConfig::from_file(&path)?;
        Ok(config)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        Ok(ColonyConfig::default())
    }
}
