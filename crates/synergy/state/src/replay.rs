//! Ordered replay of an action feed.

use synergy_types::{Action, Epoch};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::state::State;

/// Outcome of replaying a batch of actions
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub applied: usize,
    /// Position in the batch and reason of every rejected action
    pub rejected: Vec<(usize, StateError)>,
}

/// Single writer of a [`State`].
///
/// Enforces the feed contract: epochs never decrease, and every epoch
/// advance runs [`State::next_block`] before the action is applied, so
/// deadlines expire before anything at the new epoch can vote on them.
#[derive(Debug, Default)]
pub struct Replayer {
    state: State,
}

impl Replayer {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }

    /// Advance to `epoch` without applying an action.
    pub fn advance(&mut self, epoch: Epoch) -> StateResult<()> {
        let current = self.state.epoch();
        if epoch < current {
            return Err(StateError::EpochRegression {
                current,
                received: epoch,
            });
        }
        if epoch > current {
            self.state.next_block(epoch);
        }
        Ok(())
    }

    pub fn apply(&mut self, action: Action) -> StateResult<()> {
        self.advance(action.epoch())?;
        self.state.apply(action)
    }

    /// Apply every action in order. Rejected actions are reported and
    /// skipped; an epoch regression aborts the replay.
    pub fn replay<I>(&mut self, actions: I) -> StateResult<ReplayReport>
    where
        I: IntoIterator<Item = Action>,
    {
        let mut report = ReplayReport::default();
        for (position, action) in actions.into_iter().enumerate() {
            let kind = action.kind();
            self.advance(action.epoch())?;
            match self.state.apply(action) {
                Ok(()) => {
                    debug!(position, %kind, "Action applied");
                    report.applied += 1;
                }
                Err(err) => {
                    warn!(position, %kind, error = %err, "Action rejected");
                    report.rejected.push((position, err));
                }
            }
        }
        Ok(report)
    }
}
