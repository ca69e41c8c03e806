//! Training/testing engine.
//!
//! An [`Engine`] runs agents against a [`GridWorld`](crate::environment::GridWorld)
//! for a fixed number of steps, decaying exploration during training and
//! reporting every step to a [`FrameSink`](crate::tracer::FrameSink).

pub mod schedule;
pub mod trainer;

pub use schedule::EpsilonSchedule;
pub use trainer::{Engine, Hyperparameters};
