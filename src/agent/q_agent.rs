//! Action-value agent: joint state → action → value.

use rand::RngCore;

use super::snapshot::{ActionValueEntry, TableSnapshot};
use super::table::ValueTable;
use super::trait_::{explore, AgentPolicy};
use crate::config::AgentKind;
use crate::error::{Error, Result};
use crate::types::{Action, JointState};

/// One value per action, indexed by [`Action::index`].
pub type ActionValues = [f64; Action::COUNT];

/// Tabular Q-learning agent over joint states.
///
/// Greedy selection scans every lookahead candidate, picks the candidate whose
/// best action value is highest, and returns *that candidate's* best action.
/// The returned action is therefore tied to the most promising joint state,
/// not to a move that necessarily leads there from this agent's cell.
#[derive(Debug, Clone, Default)]
pub struct QAgent {
    table: ValueTable<ActionValues>,
}

impl QAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored action values of `state`, if it has been visited.
    pub fn action_values(&self, state: &JointState) -> Option<&ActionValues> {
        self.table.get(state)
    }

    /// `Q(state, action)`, reading `0.0` for unseen entries.
    pub fn value(&self, state: &JointState, action: Action) -> f64 {
        self.table
            .get(state)
            .map(|row| row[action.index()])
            .unwrap_or(0.0)
    }

    /// Best action of a row, first in action order on ties.
    fn best_action(row: &ActionValues) -> (Action, f64) {
        let mut best = (Action::Stay, f64::NEG_INFINITY);
        for action in Action::ALL {
            let v = row[action.index()];
            if v > best.1 {
                best = (action, v);
            }
        }
        best
    }
}

impl AgentPolicy for QAgent {
    fn choose(
        &mut self,
        _current: &JointState,
        candidates: &[JointState],
        epsilon: f64,
        _agent_index: usize,
        rng: &mut dyn RngCore,
    ) -> Action {
        if let Some(action) = explore(epsilon, rng) {
            return action;
        }
        match self.max_value_state(candidates) {
            Some(best) => Self::best_action(self.table.get_or_insert_default(best)).0,
            None => Action::Stay,
        }
    }

    /// `Q(s, a) += α · (r + γ · max_a' Q(s', a') − Q(s, a))`
    fn update(
        &mut self,
        state: &JointState,
        action: Action,
        reward: f64,
        next_state: &JointState,
        alpha: f64,
        gamma: f64,
    ) {
        let best_next = self
            .table
            .get_or_insert_default(next_state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let q = &mut self.table.get_or_insert_default(state)[action.index()];
        let td_error = reward + gamma * best_next - *q;
        *q += alpha * td_error;
    }

    fn max_value_state<'a>(&mut self, candidates: &'a [JointState]) -> Option<&'a JointState> {
        let mut best: Option<(&'a JointState, f64)> = None;
        for candidate in candidates {
            let (_, value) = Self::best_action(self.table.get_or_insert_default(candidate));
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((candidate, value));
            }
        }
        best.map(|(state, _)| state)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::ActionValue
    }

    fn table_len(&self) -> usize {
        self.table.len()
    }

    fn snapshot(&self) -> TableSnapshot {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(state, values)| ActionValueEntry {
                state: state.clone(),
                values: *values,
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state));
        TableSnapshot::ActionValue { entries }
    }

    fn restore(&mut self, snapshot: TableSnapshot) -> Result<()> {
        match snapshot {
            TableSnapshot::ActionValue { entries } => {
                self.table = entries.into_iter().map(|e| (e.state, e.values)).collect();
                Ok(())
            }
            other => Err(Error::SnapshotMismatch {
                expected: AgentKind::ActionValue.name(),
                found: other.kind().name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, RewardTarget};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state(x: i32) -> JointState {
        JointState::new(vec![Position::new(x, 0), Position::new(0, 0)], None)
    }

    #[test]
    fn unseen_state_reads_all_zero() {
        let mut agent = QAgent::new();
        assert_eq!(agent.action_values(&state(1)), None);
        agent.max_value_state(&[state(1)]);
        assert_eq!(agent.action_values(&state(1)), Some(&[0.0; Action::COUNT]));
    }

    #[test]
    fn choose_lazily_creates_candidate_rows() {
        let mut agent = QAgent::new();
        let mut rng = StdRng::seed_from_u64(0);
        let candidates = vec![state(1), state(2), state(3)];
        let action = agent.choose(&state(1), &candidates, 0.0, 0, &mut rng);
        assert_eq!(action, Action::Stay);
        assert_eq!(agent.table_len(), 3);
    }

    #[test]
    fn update_moves_toward_positive_target() {
        let mut agent = QAgent::new();
        agent.update(&state(1), Action::Right, 10.0, &state(2), 0.5, 0.9);
        assert!((agent.value(&state(1), Action::Right) - 5.0).abs() < 1e-12);
        assert!(agent.action_values(&state(2)).is_some());
    }

    #[test]
    fn update_moves_toward_negative_target() {
        let mut agent = QAgent::new();
        agent.update(&state(1), Action::Up, 4.0, &state(2), 1.0, 0.9);
        let before = agent.value(&state(1), Action::Up);
        agent.update(&state(1), Action::Up, -6.0, &state(2), 0.1, 0.9);
        let after = agent.value(&state(1), Action::Up);
        assert!(after < before);
        assert!(after > -6.0);
    }

    #[test]
    fn update_bootstraps_from_best_next_action() {
        let mut agent = QAgent::new();
        agent.update(&state(2), Action::Left, 10.0, &state(3), 1.0, 0.0);
        agent.update(&state(1), Action::Stay, 0.0, &state(2), 1.0, 0.5);
        assert!((agent.value(&state(1), Action::Stay) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn greedy_returns_best_action_of_best_candidate() {
        let mut agent = QAgent::new();
        agent.update(&state(2), Action::Down, 1.0, &state(9), 1.0, 0.0);
        agent.update(&state(3), Action::Left, 7.0, &state(9), 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let candidates = vec![state(1), state(2), state(3)];
        assert_eq!(agent.max_value_state(&candidates), Some(&state(3)));
        assert_eq!(
            agent.choose(&state(1), &candidates, 0.0, 0, &mut rng),
            Action::Left
        );
    }

    #[test]
    fn ties_keep_first_candidate() {
        let mut agent = QAgent::new();
        let candidates = vec![state(4), state(5)];
        assert_eq!(agent.max_value_state(&candidates), Some(&state(4)));
        assert_eq!(agent.max_value_state(&[]), None);
    }

    #[test]
    fn active_target_separates_rows() {
        let mut agent = QAgent::new();
        let plain = state(1);
        let targeted = JointState::new(plain.positions.clone(), Some(RewardTarget::UR));
        agent.update(&targeted, Action::Up, 3.0, &plain, 1.0, 0.0);
        assert_eq!(agent.value(&plain, Action::Up), 0.0);
        assert_eq!(agent.value(&targeted, Action::Up), 3.0);
    }

    #[test]
    fn restore_rejects_state_value_snapshot() {
        let mut agent = QAgent::new();
        let snapshot = TableSnapshot::StateValue { entries: vec![] };
        assert!(matches!(
            agent.restore(snapshot),
            Err(Error::SnapshotMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_restores_into_fresh_agent() {
        let mut agent = QAgent::new();
        agent.update(&state(1), Action::Right, 2.0, &state(2), 1.0, 0.0);
        let mut copy = QAgent::new();
        copy.restore(agent.snapshot()).unwrap();
        assert_eq!(copy.table_len(), 2);
        assert_eq!(copy.value(&state(1), Action::Right), 2.0);
    }
}
