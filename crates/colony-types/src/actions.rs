//! Action requests and the tri-state outcome the host returns for them.
//!
//! Every intent the decision engine has is expressed as one [`Action`] handed
//! to the host's action interface. The host answers with an
//! [`ActionOutcome`]; only [`ActionOutcome::NotInRange`] has a defined
//! recovery (a move toward the same target).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BodyPart, Role, StructureKind};
use crate::ids::{AgentId, HostileId, SiteId, SourceId, StructureId};
use crate::structs::Position;

/// A single command submitted to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Worker harvests energy from a source.
    Harvest {
        /// Acting worker.
        worker: AgentId,
        /// Source to harvest.
        source: SourceId,
    },
    /// Worker hands carried energy to a structure.
    Transfer {
        /// Acting worker.
        worker: AgentId,
        /// Receiving structure.
        target: StructureId,
    },
    /// Worker takes energy out of a structure.
    Withdraw {
        /// Acting worker.
        worker: AgentId,
        /// Structure to draw from.
        from: StructureId,
    },
    /// Worker spends energy on a construction site.
    Build {
        /// Acting worker.
        worker: AgentId,
        /// Site to progress.
        site: SiteId,
    },
    /// Worker spends energy restoring a structure's hit points.
    Repair {
        /// Acting worker.
        worker: AgentId,
        /// Structure to restore.
        target: StructureId,
    },
    /// Worker contributes energy to the controller.
    Upgrade {
        /// Acting worker.
        worker: AgentId,
    },
    /// Worker takes one step toward a cell.
    MoveTo {
        /// Acting worker.
        worker: AgentId,
        /// Destination cell.
        to: Position,
    },
    /// Tower fires at a hostile.
    TowerAttack {
        /// Acting tower.
        tower: StructureId,
        /// Hostile to hit.
        hostile: HostileId,
    },
    /// Tower restores a structure's hit points (repair or reinforcement).
    TowerRepair {
        /// Acting tower.
        tower: StructureId,
        /// Structure to restore.
        target: StructureId,
    },
    /// Enqueue a production job on the spawner.
    Spawn {
        /// Spawn structure receiving the job.
        spawner: StructureId,
        /// Name of the new worker.
        name: String,
        /// Role of the new worker.
        role: Role,
        /// Capability loadout, in order.
        body: Vec<BodyPart>,
    },
    /// Place a construction site.
    PlaceSite {
        /// Structure kind to build.
        kind: StructureKind,
        /// Target cell.
        pos: Position,
    },
}

impl Action {
    /// Short verb used in log lines.
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Harvest { .. } => "harvest",
            Self::Transfer { .. } => "transfer",
            Self::Withdraw { .. } => "withdraw",
            Self::Build { .. } => "build",
            Self::Repair { .. } => "repair",
            Self::Upgrade { .. } => "upgrade",
            Self::MoveTo { .. } => "move",
            Self::TowerAttack { .. } => "attack",
            Self::TowerRepair { .. } => "tower_repair",
            Self::Spawn { .. } => "spawn",
            Self::PlaceSite { .. } => "place_site",
        }
    }
}

/// The host's answer to an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ActionOutcome {
    /// The host accepted and committed the action.
    Accepted,
    /// The target is outside interaction range.
    NotInRange,
    /// Any other rejection. Logged, never retried within the tick.
    Failed {
        /// Host-supplied reason.
        reason: String,
    },
}

impl ActionOutcome {
    /// Shorthand for a [`ActionOutcome::Failed`] with a reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// `true` for [`ActionOutcome::Accepted`].
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}
