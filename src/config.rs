//! Configuration for the grid environment, the engine, and whole runs.
//!
//! Every struct has a `Default` matching the reference experiment and a
//! `validate` method; a [`RunConfig`] can also be read from a JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::RegimeKind;
use crate::error::{Error, Result};
use crate::types::Position;

/// Geometry and reward shaping of the grid environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    // --- Geometry ---
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
    /// Number of agents on the grid.
    pub n_agents: usize,

    // --- Reward shaping ---
    /// Reward granted to agent `i` when the target is collected.
    pub target_rewards: Vec<f64>,
    /// Bonus for every agent when all agents share one cell.
    pub together_reward: f64,
    /// Energy cost added to every agent on every step (negative).
    pub travel_reward: f64,
    /// Penalty for every agent when any agent enters a wrong zone.
    pub wrong_zone_penalty: f64,

    // --- Episodes ---
    /// An episode ends once the no-reward counter exceeds this value.
    pub no_reward_threshold: u32,
}

impl GridConfig {
    /// Grid of `width × height` with `n_agents` agents sharing one target reward.
    pub fn new(width: i32, height: i32, n_agents: usize, target_reward: f64) -> Self {
        Self {
            width,
            height,
            n_agents,
            target_rewards: vec![target_reward; n_agents],
            ..Self::default()
        }
    }

    /// The activation cell `(w/2, h/2)`.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 1 || self.height < 1 {
            return Err(Error::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.n_agents == 0 {
            return Err(Error::InvalidConfig("at least one agent is required".into()));
        }
        if self.target_rewards.len() != self.n_agents {
            return Err(Error::InvalidConfig(format!(
                "expected {} target rewards, got {}",
                self.n_agents,
                self.target_rewards.len()
            )));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            n_agents: 2,
            target_rewards: vec![100.0, 100.0],
            together_reward: 0.0,
            travel_reward: -1.0,
            wrong_zone_penalty: -500.0,
            no_reward_threshold: 50,
        }
    }
}

/// Which next state the training loop feeds into each value update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTarget {
    /// The joint state actually observed after the step (pre-reset).
    #[default]
    ObservedNext,
    /// Each agent's own best successor among the environment's lookahead
    /// candidates, enumerated after the step.
    LookaheadBest,
}

/// Which value-table shape the agents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Joint state → action → value.
    ActionValue,
    /// Joint state → value.
    #[default]
    StateValue,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::ActionValue => "action_value",
            AgentKind::StateValue => "state_value",
        }
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "q" | "action_value" => Ok(AgentKind::ActionValue),
            "v" | "state_value" => Ok(AgentKind::StateValue),
            other => Err(format!("unknown agent kind '{}'", other)),
        }
    }
}

/// Exploration schedule and logging cadence of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exploration rate at training step 0.
    pub epsilon_start: f64,
    /// Exploration rate reached at the last training step.
    pub epsilon_end: f64,
    /// Fixed exploration rate while testing.
    pub epsilon_test: f64,
    /// Frames buffered by the sink before each flush.
    pub flush_every: usize,
    /// Next-state convention for value updates.
    pub update_target: UpdateTarget,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, eps) in [
            ("epsilon_start", self.epsilon_start),
            ("epsilon_end", self.epsilon_end),
            ("epsilon_test", self.epsilon_test),
        ] {
            if !(0.0..=1.0).contains(&eps) {
                return Err(Error::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, eps
                )));
            }
        }
        if self.flush_every == 0 {
            return Err(Error::InvalidConfig("flush_every must be positive".into()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon_start: 0.99,
            epsilon_end: 0.4,
            epsilon_test: 0.0,
            flush_every: 1_000_000,
            update_target: UpdateTarget::default(),
        }
    }
}

/// One curriculum stage: a regime and its step budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub regime: RegimeKind,
    pub train_steps: u64,
    pub test_steps: u64,
}

impl Stage {
    pub fn new(regime: RegimeKind, train_steps: u64, test_steps: u64) -> Self {
        Self {
            regime,
            train_steps,
            test_steps,
        }
    }
}

/// Everything needed to reproduce one seeded curriculum run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub agent_kind: AgentKind,
    /// Learning rate α.
    pub alpha: f64,
    /// Discount factor γ.
    pub gamma: f64,
    pub stages: Vec<Stage>,
    /// Write every agent's value table once the curriculum finishes.
    pub export_tables: bool,
}

impl RunConfig {
    /// Reads and validates a run configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.engine.validate()?;
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha must lie in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidConfig(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }
        if self.stages.is_empty() {
            return Err(Error::InvalidConfig("curriculum has no stages".into()));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid: GridConfig::default(),
            engine: EngineConfig::default(),
            agent_kind: AgentKind::default(),
            alpha: 0.1,
            gamma: 0.9,
            stages: vec![
                Stage::new(RegimeKind::Center, 1_000_000, 1_000_000),
                Stage::new(RegimeKind::Mixed, 200_000_000, 1_000_000),
            ],
            export_tables: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.grid.target_rewards.len(), cfg.grid.n_agents);
        assert_eq!(cfg.grid.no_reward_threshold, 50);
    }

    #[test]
    fn center_of_odd_grid() {
        let cfg = GridConfig::new(5, 5, 2, 10.0);
        assert_eq!(cfg.center(), Position::new(2, 2));
        assert_eq!(cfg.target_rewards, vec![10.0, 10.0]);
    }

    #[test]
    fn mismatched_target_rewards_rejected() {
        let cfg = GridConfig {
            n_agents: 3,
            ..GridConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn epsilon_out_of_range_rejected() {
        let cfg = EngineConfig {
            epsilon_start: 1.5,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_curriculum_rejected() {
        let cfg = RunConfig {
            stages: Vec::new(),
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{
            "seed": 7,
            "agent_kind": "action_value",
            "stages": [{ "regime": "up_down", "train_steps": 10, "test_steps": 5 }]
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.agent_kind, AgentKind::ActionValue);
        assert_eq!(cfg.stages[0].regime, RegimeKind::UpDown);
        assert_eq!(cfg.grid, GridConfig::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_file_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("run.json");
        fs::write(&good, r#"{ "seed": 3, "alpha": 0.5 }"#).unwrap();
        let cfg = RunConfig::from_json_file(&good).unwrap();
        assert_eq!(cfg.seed, 3);
        assert_eq!(cfg.alpha, 0.5);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{ "gamma": 2.0 }"#).unwrap();
        assert!(matches!(
            RunConfig::from_json_file(&bad),
            Err(Error::InvalidConfig(_))
        ));

        assert!(matches!(
            RunConfig::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn agent_kind_parses_short_names() {
        assert_eq!("q".parse::<AgentKind>(), Ok(AgentKind::ActionValue));
        assert_eq!("v".parse::<AgentKind>(), Ok(AgentKind::StateValue));
        assert!("dqn".parse::<AgentKind>().is_err());
    }
}
