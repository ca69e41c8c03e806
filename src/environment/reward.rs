//! Reward computation for the grid environment.
//!
//! Splits a step's reward into the regime-dependent collection part and the
//! shaping terms shared by every regime.

use super::regime::RewardRule;
use crate::config::GridConfig;
use crate::types::{Position, RewardTarget};

/// Computes per-agent rewards for the grid environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Decides collection and returns the target rewards granted this step.
    ///
    /// - [`RewardRule::ActiveTarget`]: if a target is active, the reward is
    ///   granted once when *all* agents occupy the same coordinate of it.
    /// - [`RewardRule::CenterReached`]: granted when *any* agent is on the
    ///   center cell; the active target is ignored.
    pub fn collect(
        rule: RewardRule,
        positions: &[Position],
        active_target: Option<RewardTarget>,
        config: &GridConfig,
    ) -> (bool, Vec<f64>) {
        let mut rewards = vec![0.0; positions.len()];
        let collected = match rule {
            RewardRule::ActiveTarget => match active_target {
                Some(target) => target
                    .coords(config.width, config.height)
                    .iter()
                    .any(|coord| positions.iter().all(|p| p == coord)),
                None => false,
            },
            RewardRule::CenterReached => {
                let center = config.center();
                positions.iter().any(|p| *p == center)
            }
        };
        if collected {
            for (r, target_reward) in rewards.iter_mut().zip(&config.target_rewards) {
                *r += target_reward;
            }
        }
        (collected, rewards)
    }

    /// Returns true if an active target exists and any agent stands on a
    /// single-letter zone that is not part of it.
    pub fn reached_wrong_zone(
        positions: &[Position],
        active_target: Option<RewardTarget>,
        config: &GridConfig,
    ) -> bool {
        let Some(target) = active_target else {
            return false;
        };
        target
            .wrong_zones()
            .iter()
            .map(|z| z.coord(config.width, config.height))
            .any(|coord| positions.iter().any(|p| *p == coord))
    }

    /// Applies the shaping terms, in order: together bonus, travel cost,
    /// wrong-zone penalty.
    pub fn shape(rewards: &mut [f64], positions: &[Position], wrong_zone: bool, config: &GridConfig) {
        let together = match positions.first() {
            Some(first) => positions.iter().all(|p| p == first),
            None => false,
        };
        for r in rewards.iter_mut() {
            if together {
                *r += config.together_reward;
            }
            *r += config.travel_reward;
            if wrong_zone {
                *r += config.wrong_zone_penalty;
            }
        }
    }
}
