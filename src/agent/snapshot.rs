//! Serialisable copies of value tables.

use serde::{Deserialize, Serialize};

use super::q_agent::ActionValues;
use crate::config::AgentKind;
use crate::types::JointState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionValueEntry {
    pub state: JointState,
    pub values: ActionValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateValueEntry {
    pub state: JointState,
    pub value: f64,
}

/// A value table detached from its agent.
///
/// Joint states are not valid JSON object keys, so entries are stored as a
/// list of `(state, value)` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableSnapshot {
    ActionValue { entries: Vec<ActionValueEntry> },
    StateValue { entries: Vec<StateValueEntry> },
}

impl TableSnapshot {
    pub fn kind(&self) -> AgentKind {
        match self {
            TableSnapshot::ActionValue { .. } => AgentKind::ActionValue,
            TableSnapshot::StateValue { .. } => AgentKind::StateValue,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableSnapshot::ActionValue { entries } => entries.len(),
            TableSnapshot::StateValue { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
