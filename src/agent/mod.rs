//! Agent policies and their value tables.

pub mod q_agent;
pub mod snapshot;
pub mod table;
pub mod trait_;
pub mod value_agent;

pub use q_agent::{ActionValues, QAgent};
pub use snapshot::{ActionValueEntry, StateValueEntry, TableSnapshot};
pub use table::ValueTable;
pub use trait_::AgentPolicy;
pub use value_agent::ValueAgent;

use crate::config::AgentKind;

impl AgentKind {
    /// Creates a fresh agent with an empty table of this kind.
    pub fn build(&self) -> Box<dyn AgentPolicy> {
        match self {
            AgentKind::ActionValue => Box::new(QAgent::new()),
            AgentKind::StateValue => Box::new(ValueAgent::new()),
        }
    }

    /// Creates `n` fresh agents of this kind.
    pub fn build_many(&self, n: usize) -> Vec<Box<dyn AgentPolicy>> {
        (0..n).map(|_| self.build()).collect()
    }
}
