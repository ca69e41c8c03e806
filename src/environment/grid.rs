//! Grid-world environment.
//!
//! Implements the per-step loop:
//! move → activate → collect → wrong-zone check → shape → terminate.

use rand::Rng;
use tracing::{debug, trace};

use super::regime::{Lookahead, Regime};
use super::reward::RewardComputer;
use crate::config::GridConfig;
use crate::error::Result;
use crate::types::{Action, JointState, Position, RewardTarget};

/// Episode metadata reported by [`GridWorld::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepInfo {
    /// The target was activated this step.
    pub activated: bool,
    /// The reward was collected this step.
    pub collected: bool,
    /// An agent entered a zone outside the active target.
    pub wrong_zone: bool,
    /// The episode ended and the environment has already been reset.
    pub terminated: bool,
    /// No-reward counter as it stood before any termination reset.
    pub steps_without_reward: u32,
}

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Joint state right after the move, before any reset.
    pub next_state: JointState,
    /// Shaped reward of each agent.
    pub rewards: Vec<f64>,
    pub info: StepInfo,
}

/// Cooperative navigation on a `width × height` grid.
///
/// Agents start at random cells. Stepping on the center cell activates the
/// episode's true target; the agents are then rewarded for gathering on one
/// of the target's edge zones and penalised for touching any other zone.
///
/// # Lifecycle
///
/// 1. [`GridWorld::new`] builds the environment and performs a first reset.
/// 2. [`GridWorld::possible_states`] lists the candidate successors.
/// 3. [`GridWorld::step`] applies one joint action; when the episode ends the
///    environment resets itself before returning.
#[derive(Debug, Clone)]
pub struct GridWorld {
    config: GridConfig,
    regime: Regime,
    positions: Vec<Position>,
    active_target: Option<RewardTarget>,
    true_target: Option<RewardTarget>,
    steps_without_reward: u32,
}

impl GridWorld {
    /// Validates `config`, then creates the environment and resets it with
    /// `rng`.
    pub fn new<R: Rng + ?Sized>(
        config: GridConfig,
        regime: impl Into<Regime>,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let n_agents = config.n_agents;
        let mut env = Self {
            config,
            regime: regime.into(),
            positions: vec![Position::new(0, 0); n_agents],
            active_target: None,
            true_target: None,
            steps_without_reward: 0,
        };
        env.reset(rng);
        Ok(env)
    }

    /// Starts a new episode: random positions, no active target, a fresh
    /// true target drawn from the regime, and a cleared no-reward counter.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for p in &mut self.positions {
            *p = Position::new(
                rng.gen_range(0..self.config.width),
                rng.gen_range(0..self.config.height),
            );
        }
        self.active_target = None;
        self.true_target = self.regime.sample_target(rng);
        self.steps_without_reward = 0;
    }

    /// Current joint state.
    pub fn state(&self) -> JointState {
        JointState::new(self.positions.clone(), self.active_target)
    }

    /// Candidate successor joint states.
    ///
    /// With full lookahead this is the Cartesian product of every agent's
    /// five moves (`5^n` states, first agent varying slowest), each paired
    /// with the current active target. Without lookahead it is the current
    /// state alone.
    pub fn possible_states(&self) -> Vec<JointState> {
        if self.regime.lookahead == Lookahead::CurrentOnly {
            return vec![self.state()];
        }

        let per_agent: Vec<[Position; Action::COUNT]> = self
            .positions
            .iter()
            .map(|p| Action::ALL.map(|a| self.moved(p, a)))
            .collect();

        let mut combos: Vec<Vec<Position>> = vec![Vec::with_capacity(self.positions.len())];
        for moves in &per_agent {
            let mut next = Vec::with_capacity(combos.len() * Action::COUNT);
            for prefix in &combos {
                for target in moves {
                    let mut combo = prefix.clone();
                    combo.push(*target);
                    next.push(combo);
                }
            }
            combos = next;
        }

        combos
            .into_iter()
            .map(|positions| JointState::new(positions, self.active_target))
            .collect()
    }

    /// Executes one joint action.
    ///
    /// Agents without an entry in `actions` stay in place.
    pub fn step<R: Rng + ?Sized>(&mut self, actions: &[Action], rng: &mut R) -> StepResult {
        // 1. Move
        for i in 0..self.positions.len() {
            let action = actions.get(i).copied().unwrap_or(Action::Stay);
            let next = self.moved(&self.positions[i], action);
            self.positions[i] = next;
        }

        // 2. Activate
        let activated = self.try_activate();

        // 3. Collect
        let (collected, mut rewards) = RewardComputer::collect(
            self.regime.reward_rule,
            &self.positions,
            self.active_target,
            &self.config,
        );

        // 4. Wrong zones
        let wrong_zone =
            RewardComputer::reached_wrong_zone(&self.positions, self.active_target, &self.config);

        // 5. Shaping
        RewardComputer::shape(&mut rewards, &self.positions, wrong_zone, &self.config);

        // 6. Termination
        let timed_out = self.steps_without_reward > self.config.no_reward_threshold;
        let terminated = collected || timed_out || wrong_zone;
        if !terminated {
            self.steps_without_reward += 1;
        }

        let next_state = self.state();
        let info = StepInfo {
            activated,
            collected,
            wrong_zone,
            terminated,
            steps_without_reward: self.steps_without_reward,
        };
        trace!(state = %next_state, ?rewards, ?info, "step");

        if terminated {
            debug!(collected, wrong_zone, timed_out, "episode terminated");
            self.steps_without_reward = 0;
            self.reset(rng);
        }

        StepResult {
            next_state,
            rewards,
            info,
        }
    }

    /// Moves agents onto the given cells (clamped to the grid) without
    /// touching targets or counters.
    pub fn place_agents(&mut self, positions: &[Position]) {
        for (slot, p) in self.positions.iter_mut().zip(positions) {
            *slot = Position::new(
                p.x.clamp(0, self.config.width - 1),
                p.y.clamp(0, self.config.height - 1),
            );
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn active_target(&self) -> Option<RewardTarget> {
        self.active_target
    }

    /// The target that the center cell will activate this episode.
    pub fn true_target(&self) -> Option<RewardTarget> {
        self.true_target
    }

    pub fn steps_without_reward(&self) -> u32 {
        self.steps_without_reward
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn regime(&self) -> &Regime {
        &self.regime
    }

    pub fn n_agents(&self) -> usize {
        self.positions.len()
    }

    fn moved(&self, from: &Position, action: Action) -> Position {
        from.offset_clamped(action.delta(), self.config.width, self.config.height)
    }

    /// Activates the true target when none is active and any agent stands on
    /// the center cell. Reports activation even when the true target is `None`.
    fn try_activate(&mut self) -> bool {
        if self.active_target.is_some() {
            return false;
        }
        let center = self.config.center();
        if self.positions.iter().any(|p| *p == center) {
            self.active_target = self.true_target;
            return true;
        }
        false
    }
}
