//! Frame logging.
//!
//! The engine reports every step to a [`FrameSink`]: it opens a phase,
//! logs one frame per step, and closes the phase. Sinks decide how frames
//! are buffered and where they go.

pub mod csv_tracer;

pub use csv_tracer::CsvTracer;

use crate::environment::StepResult;
use crate::error::{Error, Result};
use crate::metrics::Phase;
use crate::types::{Position, RewardTarget};

/// Receiver of per-step frames.
pub trait FrameSink {
    /// Opens a buffering window for one phase of one regime.
    fn begin_phase(&mut self, flush_every: usize, regime_index: usize, phase: Phase) -> Result<()>;

    /// Records the outcome of step `step`.
    fn log_frame(&mut self, step: u64, result: &StepResult) -> Result<()>;

    /// Flushes whatever is still buffered and closes the window.
    fn end_phase(&mut self) -> Result<()>;
}

/// One logged row.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub regime_index: usize,
    pub frame_index: u64,
    pub target: Option<RewardTarget>,
    pub activated: bool,
    pub collected: bool,
    pub terminated: bool,
    pub steps_without_reward: u32,
    pub positions: Vec<Position>,
    pub rewards: Vec<f64>,
}

impl FrameRecord {
    pub fn from_step(regime_index: usize, frame_index: u64, result: &StepResult) -> Self {
        Self {
            regime_index,
            frame_index,
            target: result.next_state.target,
            activated: result.info.activated,
            collected: result.info.collected,
            terminated: result.info.terminated,
            steps_without_reward: result.info.steps_without_reward,
            positions: result.next_state.positions.clone(),
            rewards: result.rewards.clone(),
        }
    }

    /// Column names for `n_agents` agents.
    pub fn header(n_agents: usize) -> Vec<String> {
        let mut columns: Vec<String> = [
            "regime_idx",
            "frame_idx",
            "reward_loc",
            "activated",
            "collected",
            "terminated",
            "steps_without_reward",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for i in 1..=n_agents {
            columns.push(format!("a{}x", i));
            columns.push(format!("a{}y", i));
        }
        for i in 1..=n_agents {
            columns.push(format!("r{}", i));
        }
        columns
    }

    /// Row values in [`FrameRecord::header`] order. No active target is an
    /// empty field.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.regime_index.to_string(),
            self.frame_index.to_string(),
            self.target.map(|t| t.symbol().to_string()).unwrap_or_default(),
            self.activated.to_string(),
            self.collected.to_string(),
            self.terminated.to_string(),
            self.steps_without_reward.to_string(),
        ];
        for p in &self.positions {
            row.push(p.x.to_string());
            row.push(p.y.to_string());
        }
        row.extend(self.rewards.iter().map(|r| r.to_string()));
        row
    }
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn begin_phase(&mut self, _: usize, _: usize, _: Phase) -> Result<()> {
        Ok(())
    }

    fn log_frame(&mut self, _: u64, _: &StepResult) -> Result<()> {
        Ok(())
    }

    fn end_phase(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub frames: Vec<FrameRecord>,
    /// Phases opened so far, in order.
    pub phases: Vec<(Phase, usize)>,
    /// Number of phases closed so far.
    pub closed: usize,
    current: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for MemorySink {
    fn begin_phase(&mut self, _flush_every: usize, regime_index: usize, phase: Phase) -> Result<()> {
        self.phases.push((phase, regime_index));
        self.current = Some(regime_index);
        Ok(())
    }

    fn log_frame(&mut self, step: u64, result: &StepResult) -> Result<()> {
        let regime_index = self.current.ok_or(Error::PhaseNotStarted)?;
        self.frames
            .push(FrameRecord::from_step(regime_index, step, result));
        Ok(())
    }

    fn end_phase(&mut self) -> Result<()> {
        if self.current.take().is_some() {
            self.closed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StepInfo;
    use crate::types::JointState;

    fn result() -> StepResult {
        StepResult {
            next_state: JointState::new(
                vec![Position::new(1, 2), Position::new(3, 4)],
                Some(RewardTarget::UD),
            ),
            rewards: vec![-1.0, 99.5],
            info: StepInfo {
                activated: true,
                steps_without_reward: 7,
                ..StepInfo::default()
            },
        }
    }

    #[test]
    fn header_and_row_line_up() {
        let header = FrameRecord::header(2);
        let row = FrameRecord::from_step(3, 12, &result()).to_row();
        assert_eq!(header.len(), row.len());
        assert_eq!(
            header,
            vec![
                "regime_idx",
                "frame_idx",
                "reward_loc",
                "activated",
                "collected",
                "terminated",
                "steps_without_reward",
                "a1x",
                "a1y",
                "a2x",
                "a2y",
                "r1",
                "r2"
            ]
        );
        assert_eq!(
            row,
            vec!["3", "12", "ud", "true", "false", "false", "7", "1", "2", "3", "4", "-1", "99.5"]
        );
    }

    #[test]
    fn memory_sink_requires_open_phase() {
        let mut sink = MemorySink::new();
        assert!(matches!(
            sink.log_frame(0, &result()),
            Err(Error::PhaseNotStarted)
        ));
        sink.begin_phase(10, 2, Phase::Testing).unwrap();
        sink.log_frame(0, &result()).unwrap();
        sink.end_phase().unwrap();
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].regime_index, 2);
        assert_eq!(sink.phases, vec![(Phase::Testing, 2)]);
        assert_eq!(sink.closed, 1);
    }
}
