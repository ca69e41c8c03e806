//! Sequential curriculum over regimes.
//!
//! The same agents are trained and then tested on each stage in order, so
//! what they learn in one regime carries into the next. Stage `i` is logged
//! under regime index `i`.

use tracing::info;

use crate::agent::AgentPolicy;
use crate::config::RunConfig;
use crate::engine::{Engine, Hyperparameters};
use crate::environment::GridWorld;
use crate::error::{Error, Result};
use crate::metrics::PhaseSummary;
use crate::tracer::FrameSink;

/// Agents and per-phase summaries left after a curriculum run.
#[derive(Debug)]
pub struct CurriculumOutcome {
    /// Training and testing summary of every stage, in run order.
    pub summaries: Vec<PhaseSummary>,
    pub agents: Vec<Box<dyn AgentPolicy>>,
}

/// A validated run configuration ready to execute.
#[derive(Debug, Clone)]
pub struct Curriculum {
    config: RunConfig,
}

impl Curriculum {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs every stage with freshly built agents.
    pub fn run(&self, sink: &mut dyn FrameSink) -> Result<CurriculumOutcome> {
        let mut agents = self.config.agent_kind.build_many(self.config.grid.n_agents);
        let summaries = self.run_with_agents(&mut agents, sink)?;
        Ok(CurriculumOutcome { summaries, agents })
    }

    /// Runs every stage with the given agents, e.g. ones restored from disk.
    pub fn run_with_agents(
        &self,
        agents: &mut [Box<dyn AgentPolicy>],
        sink: &mut dyn FrameSink,
    ) -> Result<Vec<PhaseSummary>> {
        if agents.len() != self.config.grid.n_agents {
            return Err(Error::InvalidConfig(format!(
                "expected {} agents, got {}",
                self.config.grid.n_agents,
                agents.len()
            )));
        }

        let params = Hyperparameters {
            alpha: self.config.alpha,
            gamma: self.config.gamma,
        };
        let mut engine = Engine::new(self.config.engine.clone(), self.config.seed);
        let mut summaries = Vec::with_capacity(self.config.stages.len() * 2);

        for (idx, stage) in self.config.stages.iter().enumerate() {
            info!(
                stage = idx,
                regime = %stage.regime,
                seed = self.config.seed,
                "starting curriculum stage"
            );
            let mut env =
                GridWorld::new(self.config.grid.clone(), stage.regime, engine.rng_mut())?;
            summaries.push(engine.train(&mut env, agents, sink, stage.train_steps, params, idx)?);
            summaries.push(engine.test(&mut env, agents, sink, stage.test_steps, idx)?);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentKind, GridConfig, Stage};
    use crate::environment::RegimeKind;
    use crate::metrics::Phase;
    use crate::tracer::MemorySink;

    fn small_config() -> RunConfig {
        RunConfig {
            seed: 7,
            grid: GridConfig::new(5, 5, 2, 100.0),
            stages: vec![
                Stage::new(RegimeKind::Center, 300, 50),
                Stage::new(RegimeKind::Mixed, 300, 50),
            ],
            ..RunConfig::default()
        }
    }

    #[test]
    fn stages_run_in_order_with_shared_agents() {
        let curriculum = Curriculum::new(small_config()).unwrap();
        let mut sink = MemorySink::new();
        let outcome = curriculum.run(&mut sink).unwrap();

        let phases: Vec<_> = outcome
            .summaries
            .iter()
            .map(|s| (s.phase, s.regime_index, s.steps))
            .collect();
        assert_eq!(
            phases,
            vec![
                (Phase::Training, 0, 300),
                (Phase::Testing, 0, 50),
                (Phase::Training, 1, 300),
                (Phase::Testing, 1, 50),
            ]
        );
        assert_eq!(sink.frames.len(), 700);
        assert_eq!(outcome.agents.len(), 2);
        assert!(outcome.agents.iter().all(|a| a.table_len() > 0));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = RunConfig {
            stages: vec![],
            ..small_config()
        };
        assert!(matches!(Curriculum::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn restored_agents_must_match_agent_count() {
        let curriculum = Curriculum::new(small_config()).unwrap();
        let mut agents = AgentKind::ActionValue.build_many(1);
        let err = curriculum
            .run_with_agents(&mut agents, &mut MemorySink::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn same_seed_gives_same_summaries() {
        let run = || {
            Curriculum::new(small_config())
                .unwrap()
                .run(&mut MemorySink::new())
                .unwrap()
                .summaries
        };
        assert_eq!(run(), run());
    }
}
