//! The action interface the decision engine submits commands to.

use colony_types::{Action, ActionOutcome};

/// Accepts commands and answers each with a tri-state outcome.
///
/// Submitting is the only way the decision engine changes the world. The
/// host must make every submission all-or-nothing: an action that is not
/// [`ActionOutcome::Accepted`] leaves no partial state behind.
pub trait ActionSink {
    /// Submit one action and report how the host answered.
    fn submit(&mut self, action: Action) -> ActionOutcome;
}

/// A sink that records every action and answers from a fixed rule.
///
/// Used for dry runs and tests: by default everything is accepted, and
/// individual verbs can be scripted to answer differently.
#[derive(Debug, Default)]
pub struct ActionLog {
    /// Every submitted action with the outcome it received, in order.
    entries: Vec<(Action, ActionOutcome)>,
    /// Scripted outcomes keyed by [`Action::verb`].
    scripted: Vec<(&'static str, ActionOutcome)>,
}

impl ActionLog {
    /// Create a log that accepts everything.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            scripted: Vec::new(),
        }
    }

    /// Answer every action with the given verb using `outcome`.
    #[must_use]
    pub fn answering(mut self, verb: &'static str, outcome: ActionOutcome) -> Self {
        self.scripted.push((verb, outcome));
        self
    }

    /// Recorded actions, in submission order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.entries.iter().map(|(action, _)| action)
    }

    /// Recorded actions with their outcomes.
    pub fn entries(&self) -> &[(Action, ActionOutcome)] {
        &self.entries
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ActionSink for ActionLog {
    fn submit(&mut self, action: Action) -> ActionOutcome {
        let outcome = self
            .scripted
            .iter()
            .find(|(verb, _)| *verb == action.verb())
            .map_or(ActionOutcome::Accepted, |(_, outcome)| outcome.clone());
        self.entries.push((action, outcome.clone()));
        outcome
    }
}
