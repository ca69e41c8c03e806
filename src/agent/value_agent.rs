//! State-value agent: joint state → value.

use rand::RngCore;
use tracing::debug;

use super::snapshot::{StateValueEntry, TableSnapshot};
use super::table::ValueTable;
use super::trait_::{explore, AgentPolicy};
use crate::config::AgentKind;
use crate::error::{Error, Result};
use crate::types::{Action, JointState};

/// Tabular state-value agent.
///
/// Greedy selection picks the best-valued lookahead candidate and returns the
/// move that takes this agent from its current cell to its cell in that
/// candidate. A candidate that is not one move away (which cannot happen for
/// the environment's own lookahead) yields [`Action::Stay`].
#[derive(Debug, Clone, Default)]
pub struct ValueAgent {
    table: ValueTable<f64>,
}

impl ValueAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// `V(state)`, reading `0.0` for unseen entries.
    pub fn value(&self, state: &JointState) -> f64 {
        self.table.get(state).copied().unwrap_or(0.0)
    }

    /// Whether `state` has an entry yet.
    pub fn has_entry(&self, state: &JointState) -> bool {
        self.table.contains(state)
    }
}

impl AgentPolicy for ValueAgent {
    fn choose(
        &mut self,
        current: &JointState,
        candidates: &[JointState],
        epsilon: f64,
        agent_index: usize,
        rng: &mut dyn RngCore,
    ) -> Action {
        if let Some(action) = explore(epsilon, rng) {
            return action;
        }
        let Some(best) = self.max_value_state(candidates) else {
            return Action::Stay;
        };
        let (Some(from), Some(to)) = (current.position_of(agent_index), best.position_of(agent_index))
        else {
            return Action::Stay;
        };
        let delta = from.delta_to(&to);
        Action::from_delta(delta).unwrap_or_else(|| {
            debug!(agent_index, ?delta, "best candidate not one move away, staying");
            Action::Stay
        })
    }

    /// `V(s) = (1 − α) · V(s) + α · (r + γ · V(s'))`
    fn update(
        &mut self,
        state: &JointState,
        _action: Action,
        reward: f64,
        next_state: &JointState,
        alpha: f64,
        gamma: f64,
    ) {
        let next_value = *self.table.get_or_insert_default(next_state);
        let v = self.table.get_or_insert_default(state);
        *v = (1.0 - alpha) * *v + alpha * (reward + gamma * next_value);
    }

    fn max_value_state<'a>(&mut self, candidates: &'a [JointState]) -> Option<&'a JointState> {
        let mut best: Option<(&'a JointState, f64)> = None;
        for candidate in candidates {
            let value = *self.table.get_or_insert_default(candidate);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((candidate, value));
            }
        }
        best.map(|(state, _)| state)
    }

    fn kind(&self) -> AgentKind {
        AgentKind::StateValue
    }

    fn table_len(&self) -> usize {
        self.table.len()
    }

    fn snapshot(&self) -> TableSnapshot {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(state, value)| StateValueEntry {
                state: state.clone(),
                value: *value,
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state));
        TableSnapshot::StateValue { entries }
    }

    fn restore(&mut self, snapshot: TableSnapshot) -> Result<()> {
        match snapshot {
            TableSnapshot::StateValue { entries } => {
                self.table = entries.into_iter().map(|e| (e.state, e.value)).collect();
                Ok(())
            }
            other => Err(Error::SnapshotMismatch {
                expected: AgentKind::StateValue.name(),
                found: other.kind().name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two(a: (i32, i32), b: (i32, i32)) -> JointState {
        JointState::new(vec![a.into(), b.into()], None)
    }

    #[test]
    fn unseen_state_reads_zero() {
        let mut agent = ValueAgent::new();
        let s = two((1, 1), (2, 2));
        assert!(!agent.has_entry(&s));
        assert_eq!(agent.value(&s), 0.0);
        agent.max_value_state(std::slice::from_ref(&s));
        assert!(agent.has_entry(&s));
        assert_eq!(agent.value(&s), 0.0);
    }

    #[test]
    fn update_blends_toward_target() {
        let mut agent = ValueAgent::new();
        let s = two((1, 1), (2, 2));
        let next = two((1, 2), (2, 2));
        agent.update(&s, Action::Down, 10.0, &next, 0.1, 0.9);
        assert!((agent.value(&s) - 1.0).abs() < 1e-12);

        agent.update(&s, Action::Down, -20.0, &next, 0.5, 0.9);
        // 0.5 * 1.0 + 0.5 * (-20.0)
        assert!((agent.value(&s) + 9.5).abs() < 1e-12);
    }

    #[test]
    fn update_bootstraps_from_next_value() {
        let mut agent = ValueAgent::new();
        let s = two((0, 0), (0, 0));
        let next = two((1, 0), (0, 0));
        agent.update(&next, Action::Stay, 8.0, &s, 1.0, 0.0);
        agent.update(&s, Action::Right, 0.0, &next, 1.0, 0.5);
        assert!((agent.value(&s) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn greedy_moves_toward_best_candidate() {
        let mut agent = ValueAgent::new();
        let current = two((2, 2), (0, 0));
        let stay = two((2, 2), (0, 0));
        let left = two((1, 2), (0, 0));
        agent.update(&left, Action::Stay, 5.0, &stay, 1.0, 0.0);

        let mut rng = StdRng::seed_from_u64(0);
        let candidates = vec![stay, left];
        assert_eq!(agent.choose(&current, &candidates, 0.0, 0, &mut rng), Action::Left);
        // The second agent does not move between current and best.
        assert_eq!(agent.choose(&current, &candidates, 0.0, 1, &mut rng), Action::Stay);
    }

    #[test]
    fn unreachable_best_candidate_falls_back_to_stay() {
        let mut agent = ValueAgent::new();
        let current = two((0, 0), (4, 4));
        let far = two((3, 3), (4, 4));
        agent.update(&far, Action::Stay, 1.0, &current, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            agent.choose(&current, &[current.clone(), far], 0.0, 0, &mut rng),
            Action::Stay
        );
    }

    #[test]
    fn ties_keep_first_candidate() {
        let mut agent = ValueAgent::new();
        let a = two((0, 0), (1, 1));
        let b = two((0, 1), (1, 1));
        assert_eq!(agent.max_value_state(&[a.clone(), b]), Some(&a));
    }

    #[test]
    fn empty_candidates_stay() {
        let mut agent = ValueAgent::new();
        let mut rng = StdRng::seed_from_u64(0);
        let current = JointState::new(vec![Position::new(0, 0)], None);
        assert_eq!(agent.choose(&current, &[], 0.0, 0, &mut rng), Action::Stay);
    }

    #[test]
    fn restore_round_trips_values() {
        let mut agent = ValueAgent::new();
        let s = two((1, 1), (2, 2));
        agent.update(&s, Action::Stay, 3.0, &s, 1.0, 0.0);
        let mut copy = ValueAgent::new();
        copy.restore(agent.snapshot()).unwrap();
        assert_eq!(copy.value(&s), 3.0);
        assert!(copy
            .restore(TableSnapshot::ActionValue { entries: vec![] })
            .is_err());
    }
}
