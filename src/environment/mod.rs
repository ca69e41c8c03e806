//! Grid environment with curriculum regimes.
//!
//! One [`GridWorld`] type serves every curriculum stage; the stage-specific
//! behaviour comes from the [`Regime`] it is built with.

pub mod grid;
pub mod regime;
pub mod reward;

pub use grid::{GridWorld, StepInfo, StepResult};
pub use regime::{Lookahead, Regime, RegimeKind, RewardRule};
pub use reward::RewardComputer;
