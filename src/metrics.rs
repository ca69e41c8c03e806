//! Per-phase statistics gathered by the engine.
//!
//! Counts episode outcomes and accumulates rewards over one training or
//! testing phase.

use std::fmt;

use crate::environment::StepResult;

/// Training or testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Training,
    Testing,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Training => "training",
            Phase::Testing => "testing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregated outcome of one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSummary {
    pub phase: Phase,
    /// Curriculum ordinal of the regime the phase ran in.
    pub regime_index: usize,
    pub steps: u64,
    /// Number of terminated episodes.
    pub episodes: u64,
    pub activations: u64,
    pub collections: u64,
    pub wrong_zones: u64,
    /// Episodes that ended by exceeding the no-reward threshold.
    pub timeouts: u64,
    /// Sum of step rewards, per agent.
    pub total_rewards: Vec<f64>,
}

impl PhaseSummary {
    pub fn new(phase: Phase, regime_index: usize, n_agents: usize) -> Self {
        Self {
            phase,
            regime_index,
            steps: 0,
            episodes: 0,
            activations: 0,
            collections: 0,
            wrong_zones: 0,
            timeouts: 0,
            total_rewards: vec![0.0; n_agents],
        }
    }

    /// Folds one step into the summary.
    pub fn record(&mut self, result: &StepResult) {
        let info = &result.info;
        self.steps += 1;
        self.activations += info.activated as u64;
        self.collections += info.collected as u64;
        self.wrong_zones += info.wrong_zone as u64;
        if info.terminated {
            self.episodes += 1;
            if !info.collected && !info.wrong_zone {
                self.timeouts += 1;
            }
        }
        for (total, r) in self.total_rewards.iter_mut().zip(&result.rewards) {
            *total += r;
        }
    }

    /// Share of terminated episodes that ended with a collection.
    pub fn collection_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.collections as f64 / self.episodes as f64
        }
    }

    /// Mean step reward across all agents.
    pub fn mean_step_reward(&self) -> f64 {
        if self.steps == 0 || self.total_rewards.is_empty() {
            return 0.0;
        }
        let total: f64 = self.total_rewards.iter().sum();
        total / (self.steps as f64 * self.total_rewards.len() as f64)
    }
}

impl fmt::Display for PhaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} regime {} ({} steps) ===",
            self.phase, self.regime_index, self.steps
        )?;
        writeln!(f, "  Episodes:          {}", self.episodes)?;
        writeln!(f, "  Activations:       {}", self.activations)?;
        writeln!(
            f,
            "  Collections:       {} ({:.1}%)",
            self.collections,
            self.collection_rate() * 100.0
        )?;
        writeln!(f, "  Wrong zones:       {}", self.wrong_zones)?;
        writeln!(f, "  Timeouts:          {}", self.timeouts)?;
        write!(f, "  Mean step reward:  {:.3}", self.mean_step_reward())
    }
}
