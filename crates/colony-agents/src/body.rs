//! Loadout sizing.
//!
//! Bodies are a step function of the energy budget: every budget inside a
//! tier yields the same layout, so the scheduler can predict cost and
//! production time before committing.

use colony_types::{BodyPart, Role};

use BodyPart::{Carry, Move, Work};

/// The smallest viable worker.
pub const CHEAPEST: [BodyPart; 3] = [Work, Carry, Move];

const SMALL: [BodyPart; 4] = [Work, Work, Carry, Move];
const MEDIUM: [BodyPart; 6] = [Work, Work, Carry, Carry, Move, Move];
const LARGE_WORKER: [BodyPart; 8] = [Work, Work, Work, Carry, Carry, Move, Move, Move];
const LARGE_BUILDER: [BodyPart; 8] = [Work, Work, Carry, Carry, Move, Move, Move, Move];

/// Energy cost of [`CHEAPEST`].
pub const CHEAPEST_COST: u32 = 200;

/// Budget at which the largest layouts unlock.
pub const MAX_LOADOUT_COST: u32 = 550;

/// The loadout for `role` given `budget` energy.
///
/// Budgets below [`CHEAPEST_COST`] still return [`CHEAPEST`]; callers gate
/// on affordability separately.
pub fn loadout(role: Role, budget: u32) -> Vec<BodyPart> {
    if budget >= MAX_LOADOUT_COST {
        match role {
            Role::Harvester | Role::Upgrader => LARGE_WORKER.to_vec(),
            Role::Builder => LARGE_BUILDER.to_vec(),
        }
    } else if budget >= 400 {
        MEDIUM.to_vec()
    } else if budget >= 300 {
        SMALL.to_vec()
    } else {
        CHEAPEST.to_vec()
    }
}
