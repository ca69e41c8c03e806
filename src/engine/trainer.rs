//! Training and testing loops.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::schedule::EpsilonSchedule;
use crate::agent::AgentPolicy;
use crate::config::{EngineConfig, UpdateTarget};
use crate::environment::GridWorld;
use crate::error::{Error, Result};
use crate::metrics::{Phase, PhaseSummary};
use crate::tracer::FrameSink;
use crate::types::{Action, JointState};

/// Learning rate and discount of the tabular updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    /// Learning rate α.
    pub alpha: f64,
    /// Discount factor γ.
    pub gamma: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
        }
    }
}

struct PhaseRun {
    phase: Phase,
    regime_index: usize,
    num_steps: u64,
    schedule: EpsilonSchedule,
    learning: Option<Hyperparameters>,
}

/// Drives agents through an environment, one joint action per step.
///
/// Per step: enumerate lookahead → every agent chooses → environment steps →
/// (training only) every agent updates → frame is logged. The engine owns the
/// random source used for exploration and for environment resets.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    rng: StdRng,
}

impl Engine {
    /// Creates an engine whose random source is seeded with `seed`.
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared random source, e.g. for building environments.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Trains for `num_steps` steps with ε decaying linearly from
    /// `epsilon_start` to `epsilon_end`.
    pub fn train(
        &mut self,
        env: &mut GridWorld,
        agents: &mut [Box<dyn AgentPolicy>],
        sink: &mut dyn FrameSink,
        num_steps: u64,
        params: Hyperparameters,
        regime_index: usize,
    ) -> Result<PhaseSummary> {
        let run = PhaseRun {
            phase: Phase::Training,
            regime_index,
            num_steps,
            schedule: EpsilonSchedule::linear(
                self.config.epsilon_start,
                self.config.epsilon_end,
                num_steps,
            ),
            learning: Some(params),
        };
        self.run_phase(env, agents, sink, run)
    }

    /// Runs `num_steps` steps at the fixed test ε without updating any table.
    pub fn test(
        &mut self,
        env: &mut GridWorld,
        agents: &mut [Box<dyn AgentPolicy>],
        sink: &mut dyn FrameSink,
        num_steps: u64,
        regime_index: usize,
    ) -> Result<PhaseSummary> {
        let run = PhaseRun {
            phase: Phase::Testing,
            regime_index,
            num_steps,
            schedule: EpsilonSchedule::constant(self.config.epsilon_test),
            learning: None,
        };
        self.run_phase(env, agents, sink, run)
    }

    fn run_phase(
        &mut self,
        env: &mut GridWorld,
        agents: &mut [Box<dyn AgentPolicy>],
        sink: &mut dyn FrameSink,
        run: PhaseRun,
    ) -> Result<PhaseSummary> {
        if agents.len() != env.n_agents() {
            return Err(Error::InvalidConfig(format!(
                "{} agents given for an environment with {}",
                agents.len(),
                env.n_agents()
            )));
        }

        info!(
            phase = %run.phase,
            regime = run.regime_index,
            regime_name = %env.regime().name,
            steps = run.num_steps,
            "phase started"
        );

        env.reset(&mut self.rng);
        sink.begin_phase(self.config.flush_every, run.regime_index, run.phase)?;

        let mut summary = PhaseSummary::new(run.phase, run.regime_index, agents.len());
        if let Err(e) = self.run_steps(env, agents, sink, &run, &mut summary) {
            // Whatever was buffered before the failure still reaches the sink.
            if let Err(close) = sink.end_phase() {
                warn!(error = %close, "closing phase after a failed step also failed");
            }
            return Err(e);
        }
        sink.end_phase()?;

        info!(
            phase = %run.phase,
            regime = run.regime_index,
            episodes = summary.episodes,
            collections = summary.collections,
            wrong_zones = summary.wrong_zones,
            mean_reward = summary.mean_step_reward(),
            "phase finished"
        );
        Ok(summary)
    }

    fn run_steps(
        &mut self,
        env: &mut GridWorld,
        agents: &mut [Box<dyn AgentPolicy>],
        sink: &mut dyn FrameSink,
        run: &PhaseRun,
        summary: &mut PhaseSummary,
    ) -> Result<()> {
        let progress_every = (run.num_steps / 10).max(1);
        let mut actions: Vec<Action> = Vec::with_capacity(agents.len());

        for step in 0..run.num_steps {
            let epsilon = run.schedule.value_at(step);
            let candidates = env.possible_states();
            let state = env.state();

            actions.clear();
            for (i, agent) in agents.iter_mut().enumerate() {
                actions.push(agent.choose(&state, &candidates, epsilon, i, &mut self.rng));
            }

            let result = env.step(&actions, &mut self.rng);

            if let Some(params) = run.learning {
                self.update_agents(
                    env,
                    agents,
                    &state,
                    &actions,
                    &result.rewards,
                    &result.next_state,
                    params,
                );
            }

            summary.record(&result);
            sink.log_frame(step, &result)?;

            if step % progress_every == 0 {
                debug!(step, epsilon, episodes = summary.episodes, "progress");
            }
        }
        Ok(())
    }

    /// Feeds the realised transition into every agent's table.
    ///
    /// With [`UpdateTarget::LookaheadBest`] the next state is each agent's own
    /// best candidate from the environment's lookahead *after* the step; if
    /// the step ended the episode that lookahead already belongs to the fresh
    /// episode.
    #[allow(clippy::too_many_arguments)]
    fn update_agents(
        &self,
        env: &GridWorld,
        agents: &mut [Box<dyn AgentPolicy>],
        state: &JointState,
        actions: &[Action],
        rewards: &[f64],
        observed_next: &JointState,
        params: Hyperparameters,
    ) {
        let lookahead = match self.config.update_target {
            UpdateTarget::ObservedNext => None,
            UpdateTarget::LookaheadBest => Some(env.possible_states()),
        };
        for (i, agent) in agents.iter_mut().enumerate() {
            let next = match &lookahead {
                Some(candidates) => agent
                    .max_value_state(candidates)
                    .cloned()
                    .unwrap_or_else(|| observed_next.clone()),
                None => observed_next.clone(),
            };
            agent.update(state, actions[i], rewards[i], &next, params.alpha, params.gamma);
        }
    }
}
