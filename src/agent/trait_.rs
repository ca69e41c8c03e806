//! Policy trait shared by both value-table variants.

use std::fmt;

use rand::{Rng, RngCore};

use super::snapshot::TableSnapshot;
use crate::config::AgentKind;
use crate::error::Result;
use crate::types::{Action, JointState};

/// One agent's learned values plus its epsilon-greedy action selection.
///
/// The environment owns every position; a policy reads its own position from
/// the current joint state it is handed.
pub trait AgentPolicy: fmt::Debug + Send {
    /// Picks an action for agent `agent_index`.
    ///
    /// With probability `epsilon` the action is uniformly random; otherwise
    /// it is derived deterministically from the best-valued candidate among
    /// `candidates` (the environment's lookahead).
    fn choose(
        &mut self,
        current: &JointState,
        candidates: &[JointState],
        epsilon: f64,
        agent_index: usize,
        rng: &mut dyn RngCore,
    ) -> Action;

    /// Applies one tabular learning update for the realised transition.
    fn update(
        &mut self,
        state: &JointState,
        action: Action,
        reward: f64,
        next_state: &JointState,
        alpha: f64,
        gamma: f64,
    );

    /// Returns the best-valued candidate, first one on ties. Unseen
    /// candidates are inserted with the default value.
    fn max_value_state<'a>(&mut self, candidates: &'a [JointState]) -> Option<&'a JointState>;

    fn kind(&self) -> AgentKind;

    /// Number of joint states stored so far.
    fn table_len(&self) -> usize;

    /// Copies the value table into a serialisable form.
    fn snapshot(&self) -> TableSnapshot;

    /// Replaces the value table with `snapshot`.
    fn restore(&mut self, snapshot: TableSnapshot) -> Result<()>;
}

/// Exploration branch of epsilon-greedy selection.
pub(crate) fn explore(epsilon: f64, rng: &mut dyn RngCore) -> Option<Action> {
    if rng.gen::<f64>() < epsilon {
        Some(Action::ALL[rng.gen_range(0..Action::COUNT)])
    } else {
        None
    }
}
