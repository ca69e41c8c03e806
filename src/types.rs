//! Core types shared by policies, the environment, and the engine.
//!
//! Defines grid positions, the discrete action set, the symbolic reward
//! targets, and the joint state used as the sole key into value tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An integer cell on the grid, `[0, width-1] × [0, height-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by `delta` and clamped to the grid bounds.
    pub fn offset_clamped(&self, delta: (i32, i32), width: i32, height: i32) -> Self {
        Self {
            x: (self.x + delta.0).clamp(0, width - 1),
            y: (self.y + delta.1).clamp(0, height - 1),
        }
    }

    /// Displacement from `self` to `other`.
    pub fn delta_to(&self, other: &Position) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the five moves available to every agent.
///
/// `up` decreases `y` and `down` increases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stay,
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Number of actions.
    pub const COUNT: usize = 5;

    /// All actions, in table order.
    pub const ALL: [Action; Action::COUNT] = [
        Action::Stay,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
    ];

    /// Unit displacement `(dx, dy)` of this action.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::Stay => (0, 0),
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    /// Inverse of [`Action::delta`]. Returns `None` for displacements no
    /// single action produces.
    pub fn from_delta(delta: (i32, i32)) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.delta() == delta)
    }

    /// Index of this action into an action-value row.
    pub fn index(&self) -> usize {
        match self {
            Action::Stay => 0,
            Action::Up => 1,
            Action::Down => 2,
            Action::Left => 3,
            Action::Right => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Stay => "stay",
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// A reward zone at the midpoint of one grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Top edge, `(w/2, h-1)`.
    U,
    /// Right edge, `(w-1, h/2)`.
    R,
    /// Bottom edge, `(w/2, 0)`.
    D,
    /// Left edge, `(0, h/2)`.
    L,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::U, Zone::R, Zone::D, Zone::L];

    /// Board coordinate of this zone on a `width × height` grid.
    pub fn coord(&self, width: i32, height: i32) -> Position {
        match self {
            Zone::U => Position::new(width / 2, height - 1),
            Zone::R => Position::new(width - 1, height / 2),
            Zone::D => Position::new(width / 2, 0),
            Zone::L => Position::new(0, height / 2),
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Zone::U => 'u',
            Zone::R => 'r',
            Zone::D => 'd',
            Zone::L => 'l',
        }
    }
}

/// Symbolic reward target: a single edge zone or a pair of them.
///
/// Collecting a pair target means gathering every agent on either one of
/// its two zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTarget {
    U,
    R,
    D,
    L,
    UR,
    RD,
    DL,
    UL,
    UD,
    RL,
}

impl RewardTarget {
    /// The six two-zone targets, in curriculum order.
    pub const PAIRS: [RewardTarget; 6] = [
        RewardTarget::UR,
        RewardTarget::RD,
        RewardTarget::DL,
        RewardTarget::UL,
        RewardTarget::RL,
        RewardTarget::UD,
    ];

    /// The zones spelled by this target's symbol, in symbol order.
    pub fn zones(&self) -> &'static [Zone] {
        match self {
            RewardTarget::U => &[Zone::U],
            RewardTarget::R => &[Zone::R],
            RewardTarget::D => &[Zone::D],
            RewardTarget::L => &[Zone::L],
            RewardTarget::UR => &[Zone::U, Zone::R],
            RewardTarget::RD => &[Zone::R, Zone::D],
            RewardTarget::DL => &[Zone::D, Zone::L],
            RewardTarget::UL => &[Zone::U, Zone::L],
            RewardTarget::UD => &[Zone::U, Zone::D],
            RewardTarget::RL => &[Zone::R, Zone::L],
        }
    }

    /// Reward coordinates of this target on a `width × height` grid.
    pub fn coords(&self, width: i32, height: i32) -> Vec<Position> {
        self.zones().iter().map(|z| z.coord(width, height)).collect()
    }

    /// Single-letter zones that are not part of this target.
    pub fn wrong_zones(&self) -> Vec<Zone> {
        let own = self.zones();
        Zone::ALL
            .into_iter()
            .filter(|z| !own.contains(z))
            .collect()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RewardTarget::U => "u",
            RewardTarget::R => "r",
            RewardTarget::D => "d",
            RewardTarget::L => "l",
            RewardTarget::UR => "ur",
            RewardTarget::RD => "rd",
            RewardTarget::DL => "dl",
            RewardTarget::UL => "ul",
            RewardTarget::UD => "ud",
            RewardTarget::RL => "rl",
        }
    }
}

impl fmt::Display for RewardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for RewardTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" => Ok(RewardTarget::U),
            "r" => Ok(RewardTarget::R),
            "d" => Ok(RewardTarget::D),
            "l" => Ok(RewardTarget::L),
            "ur" => Ok(RewardTarget::UR),
            "rd" => Ok(RewardTarget::RD),
            "dl" => Ok(RewardTarget::DL),
            "ul" => Ok(RewardTarget::UL),
            "ud" => Ok(RewardTarget::UD),
            "rl" => Ok(RewardTarget::RL),
            other => Err(format!("unknown reward target '{}'", other)),
        }
    }
}

/// Positions of every agent (in agent index order) plus the active target.
///
/// This is the key of every value table; two joint states are equal only if
/// every agent sits on the same cell and the same target is active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointState {
    pub positions: Vec<Position>,
    pub target: Option<RewardTarget>,
}

impl JointState {
    pub fn new(positions: Vec<Position>, target: Option<RewardTarget>) -> Self {
        Self { positions, target }
    }

    /// Position of agent `agent_index`, if present.
    pub fn position_of(&self, agent_index: usize) -> Option<Position> {
        self.positions.get(agent_index).copied()
    }

    pub fn n_agents(&self) -> usize {
        self.positions.len()
    }
}

impl fmt::Display for JointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.positions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        match self.target {
            Some(t) => write!(f, "] target={}", t),
            None => write!(f, "] target=none"),
        }
    }
}
