//! Curriculum regimes.
//!
//! A regime fixes which true targets can be drawn at reset and which of the
//! two rule hooks (reward computation, successor enumeration) the grid uses.
//!
//! | Kind                 | Possibilities        | Reward rule      | Lookahead     |
//! |----------------------|----------------------|------------------|---------------|
//! | `Center`             | `none`               | center reached   | full          |
//! | `RightLeft`          | `rl`                 | active target    | full          |
//! | `UpDown`             | `ud`                 | active target    | full          |
//! | `Mixed`              | six pair targets     | active target    | full          |
//! | `MixedNoLookahead`   | six pair targets     | active target    | current only  |

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::RewardTarget;

/// How collection and target rewards are decided each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardRule {
    /// All agents must stand together on one coordinate of the active target.
    ActiveTarget,
    /// Any single agent on the center cell collects, regardless of target.
    CenterReached,
}

/// How successor joint states are enumerated for the policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    /// Every combination of per-agent actions (`5^n` states).
    Full,
    /// Only the current joint state.
    CurrentOnly,
}

/// The built-in curriculum stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeKind {
    Center,
    RightLeft,
    UpDown,
    Mixed,
    MixedNoLookahead,
}

impl RegimeKind {
    pub const ALL: [RegimeKind; 5] = [
        RegimeKind::Center,
        RegimeKind::RightLeft,
        RegimeKind::UpDown,
        RegimeKind::Mixed,
        RegimeKind::MixedNoLookahead,
    ];

    /// Looks a regime up by its curriculum number (0–4).
    pub fn from_index(index: usize) -> Option<RegimeKind> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            RegimeKind::Center => 0,
            RegimeKind::RightLeft => 1,
            RegimeKind::UpDown => 2,
            RegimeKind::Mixed => 3,
            RegimeKind::MixedNoLookahead => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RegimeKind::Center => "center",
            RegimeKind::RightLeft => "right_left",
            RegimeKind::UpDown => "up_down",
            RegimeKind::Mixed => "mixed",
            RegimeKind::MixedNoLookahead => "mixed_no_lookahead",
        }
    }

    /// Builds the full regime description for this kind.
    pub fn regime(&self) -> Regime {
        let (possibilities, reward_rule, lookahead) = match self {
            RegimeKind::Center => (vec![None], RewardRule::CenterReached, Lookahead::Full),
            RegimeKind::RightLeft => (
                vec![Some(RewardTarget::RL)],
                RewardRule::ActiveTarget,
                Lookahead::Full,
            ),
            RegimeKind::UpDown => (
                vec![Some(RewardTarget::UD)],
                RewardRule::ActiveTarget,
                Lookahead::Full,
            ),
            RegimeKind::Mixed => (pairs(), RewardRule::ActiveTarget, Lookahead::Full),
            RegimeKind::MixedNoLookahead => {
                (pairs(), RewardRule::ActiveTarget, Lookahead::CurrentOnly)
            }
        };
        Regime {
            name: self.name().to_string(),
            possibilities,
            reward_rule,
            lookahead,
        }
    }
}

fn pairs() -> Vec<Option<RewardTarget>> {
    RewardTarget::PAIRS.into_iter().map(Some).collect()
}

impl fmt::Display for RegimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegimeKind {
    type Err = String;

    /// Accepts either the regime name or its curriculum number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return RegimeKind::from_index(index)
                .ok_or_else(|| format!("regime index {} out of range 0..=4", index));
        }
        RegimeKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown regime '{}'", s))
    }
}

/// A curriculum stage as seen by the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Regime {
    pub name: String,
    /// Candidate true targets, drawn uniformly at every reset.
    pub possibilities: Vec<Option<RewardTarget>>,
    pub reward_rule: RewardRule,
    pub lookahead: Lookahead,
}

impl Regime {
    /// A regime outside the built-in curriculum.
    pub fn custom(
        name: impl Into<String>,
        possibilities: Vec<Option<RewardTarget>>,
        reward_rule: RewardRule,
        lookahead: Lookahead,
    ) -> Self {
        Self {
            name: name.into(),
            possibilities,
            reward_rule,
            lookahead,
        }
    }

    /// Draws the episode's true target. An empty possibility list yields `None`.
    pub fn sample_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RewardTarget> {
        if self.possibilities.is_empty() {
            return None;
        }
        self.possibilities[rng.gen_range(0..self.possibilities.len())]
    }
}

impl From<RegimeKind> for Regime {
    fn from(kind: RegimeKind) -> Self {
        kind.regime()
    }
}
