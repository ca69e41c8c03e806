//! cogrid - cooperative multi-agent tabular learning on a gridworld.
//!
//! Agents move on a rectangular grid, activate a reward target by stepping
//! on the center cell, and are rewarded for gathering on the target's edge
//! zones. Training runs as a curriculum of reward regimes that reuse the
//! same agents.
//!
//! - [`environment`]: the grid world and its regimes
//! - [`agent`]: action-value and state-value epsilon-greedy policies
//! - [`engine`]: training/testing loops
//! - [`tracer`]: per-step frame logging
//! - [`curriculum`] and [`sweep`]: staged and multi-seed runs

pub mod agent;
pub mod config;
pub mod curriculum;
pub mod engine;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod sweep;
pub mod tracer;
pub mod types;

pub use agent::{AgentPolicy, QAgent, ValueAgent};
pub use config::{AgentKind, EngineConfig, GridConfig, RunConfig, Stage, UpdateTarget};
pub use curriculum::{Curriculum, CurriculumOutcome};
pub use engine::{Engine, Hyperparameters};
pub use environment::{GridWorld, Regime, RegimeKind, StepInfo, StepResult};
pub use error::{Error, Result};
pub use metrics::{Phase, PhaseSummary};
pub use tracer::{CsvTracer, FrameSink, MemorySink, NullSink};
pub use types::{Action, JointState, Position, RewardTarget, Zone};
