//! Exploration-rate schedule.

/// Linear decay from `start` at step 0 to `end` at step `steps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonSchedule {
    pub start: f64,
    pub end: f64,
    pub steps: u64,
}

impl EpsilonSchedule {
    pub fn linear(start: f64, end: f64, steps: u64) -> Self {
        Self { start, end, steps }
    }

    /// A schedule that never changes.
    pub fn constant(epsilon: f64) -> Self {
        Self::linear(epsilon, epsilon, 0)
    }

    pub fn value_at(&self, step: u64) -> f64 {
        if self.steps == 0 {
            return self.start;
        }
        (self.end - self.start) / self.steps as f64 * step as f64 + self.start
    }
}
