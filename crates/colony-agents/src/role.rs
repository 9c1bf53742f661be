//! The per-worker gather/deliver state machine.
//!
//! [`run_worker`] is called once per worker per tick. It first applies the
//! mode transition (full means deliver, empty means gather, and either
//! transition drops the cached target), then issues exactly one primary
//! action. When the host answers [`ActionOutcome::NotInRange`] the worker
//! moves toward the same target instead; any other failure is logged and
//! the worker's turn ends.

use colony_types::{Action, ActionOutcome, Role, TaskMode, Worker, WorldSnapshot};
use colony_types::{Position, SourceId};
use colony_world::{Host, WorldQuery};
use tracing::{debug, warn};

use crate::config::RoleConfig;
use crate::memory::WorkerMemory;
use crate::target::{
    CachedTarget, SelectionContext, TargetPredicate, TargetRef, delivery_chain, select_first,
    select_source,
};

/// How a worker's turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerTurn {
    /// The primary action was accepted.
    Acted,
    /// The target was out of range and the worker moved toward it.
    Moved,
    /// The host rejected the action; nothing else was attempted.
    Failed,
    /// Nothing to gather from this tick.
    Idle,
    /// The whole delivery chain came up empty.
    NoViableTarget,
}

/// Read-only inputs shared by every worker in a tick.
pub struct RoleContext<'a> {
    /// World state at the start of the tick.
    pub snapshot: &'a WorldSnapshot,
    /// Selection tunables.
    pub config: &'a RoleConfig,
}

/// Apply the mode transition for `worker`. Returns `true` if the mode
/// changed, in which case the cached target has been dropped.
pub fn update_mode(worker: &Worker, memory: &mut WorkerMemory) -> bool {
    let next = match memory.mode {
        TaskMode::Delivering if worker.store.is_empty() => TaskMode::Gathering,
        TaskMode::Gathering if worker.store.free_capacity() == 0 => TaskMode::Delivering,
        _ => return false,
    };
    memory.mode = next;
    memory.target = None;
    true
}

/// Decide and submit this tick's action for one worker.
pub fn run_worker(
    worker: &Worker,
    memory: &mut WorkerMemory,
    ctx: &RoleContext<'_>,
    host: &mut dyn Host,
) -> WorkerTurn {
    if update_mode(worker, memory) {
        debug!(worker = %worker.name, mode = ?memory.mode, "mode changed");
    }
    match memory.mode {
        TaskMode::Gathering => gather(worker, memory, ctx, host),
        TaskMode::Delivering => deliver(worker, memory, ctx, host),
    }
}

fn gather(
    worker: &Worker,
    memory: &mut WorkerMemory,
    ctx: &RoleContext<'_>,
    host: &mut dyn Host,
) -> WorkerTurn {
    if worker.role == Role::Upgrader
        && let Some(storage) = ctx.snapshot.storage().filter(|s| s.stored_energy() > 0)
    {
        let action = Action::Withdraw {
            worker: worker.id,
            from: storage.id,
        };
        return attempt(worker, action, storage.pos, host);
    }

    let cached = memory
        .source
        .filter(|id| ctx.snapshot.sources.get(id).is_some_and(|s| s.energy > 0));
    let source = cached.or_else(|| select_source(&selection(worker, ctx, &*host)));
    memory.source = source;

    let Some((id, pos)) = source.and_then(|id| source_pos(ctx.snapshot, id)) else {
        return WorkerTurn::Idle;
    };
    let action = Action::Harvest {
        worker: worker.id,
        source: id,
    };
    attempt(worker, action, pos, host)
}

fn deliver(
    worker: &Worker,
    memory: &mut WorkerMemory,
    ctx: &RoleContext<'_>,
    host: &mut dyn Host,
) -> WorkerTurn {
    let cached = memory
        .target
        .and_then(|target| target.resolve(ctx.snapshot).map(|pos| (target, pos)));

    let (target, pos) = if let Some(hit) = cached {
        hit
    } else {
        let chain = delivery_chain(worker.role);
        let picked = select_first(chain, &selection(worker, ctx, &*host)).and_then(|selection| {
            selection
                .target
                .resolve(ctx.snapshot)
                .map(|pos| (selection, pos))
        });
        let Some((selection, pos)) = picked else {
            memory.target = None;
            warn!(worker = %worker.name, role = %worker.role, "no viable delivery target");
            return WorkerTurn::NoViableTarget;
        };
        debug!(worker = %worker.name, selector = selection.label, "selected delivery target");
        memory.target = (!selection.fallback).then_some(selection.target);
        (selection.target, pos)
    };

    attempt(worker, delivery_action(worker, target), pos, host)
}

fn delivery_action(worker: &Worker, target: CachedTarget) -> Action {
    let id = worker.id;
    match target.target {
        TargetRef::Structure(structure) => match target.predicate {
            TargetPredicate::BelowHits(_) => Action::Repair {
                worker: id,
                target: structure,
            },
            _ => Action::Transfer {
                worker: id,
                target: structure,
            },
        },
        TargetRef::Site(site) => Action::Build { worker: id, site },
        TargetRef::Source(source) => Action::Harvest { worker: id, source },
        TargetRef::Controller => Action::Upgrade { worker: id },
    }
}

/// Submit `action`; on a range error, move toward `pos` instead.
fn attempt(worker: &Worker, action: Action, pos: Position, host: &mut dyn Host) -> WorkerTurn {
    let verb = action.verb();
    match host.submit(action) {
        ActionOutcome::Accepted => WorkerTurn::Acted,
        ActionOutcome::NotInRange => {
            match host.submit(Action::MoveTo {
                worker: worker.id,
                to: pos,
            }) {
                ActionOutcome::Accepted => WorkerTurn::Moved,
                ActionOutcome::NotInRange => WorkerTurn::Failed,
                ActionOutcome::Failed { reason } => {
                    debug!(worker = %worker.name, %pos, %reason, "move failed");
                    WorkerTurn::Failed
                }
            }
        }
        ActionOutcome::Failed { reason } => {
            debug!(worker = %worker.name, verb, %reason, "action failed");
            WorkerTurn::Failed
        }
    }
}

fn selection<'a>(
    worker: &'a Worker,
    ctx: &RoleContext<'a>,
    world: &'a dyn WorldQuery,
) -> SelectionContext<'a> {
    SelectionContext {
        snapshot: ctx.snapshot,
        world,
        worker,
        config: ctx.config,
    }
}

fn source_pos(snapshot: &WorldSnapshot, id: SourceId) -> Option<(SourceId, Position)> {
    snapshot.sources.get(&id).map(|s| (id, s.pos))
}
