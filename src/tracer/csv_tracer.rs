//! CSV frame sink with batched flushes.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{FrameRecord, FrameSink};
use crate::environment::StepResult;
use crate::error::{Error, Result};
use crate::metrics::Phase;

/// Writes frames to `<root>/logs/<phase>_<regime>.csv`.
///
/// Rows are buffered and written every `flush_every` frames; the file and
/// its header are created on the first flush, so a phase without frames
/// leaves no file behind.
#[derive(Debug)]
pub struct CsvTracer {
    root: PathBuf,
    active: Option<ActivePhase>,
}

#[derive(Debug)]
struct ActivePhase {
    regime_index: usize,
    flush_every: usize,
    path: PathBuf,
    buffer: Vec<FrameRecord>,
    writer: Option<csv::Writer<File>>,
}

impl CsvTracer {
    /// Creates a tracer rooted at `root`, clearing anything already there.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            fs::remove_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        }
        let logs = root.join("logs");
        fs::create_dir_all(&logs).map_err(|e| Error::io(&logs, e))?;
        Ok(Self { root, active: None })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory value tables are exported to.
    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("qvals")
    }

    /// File a given phase of a given regime is logged to.
    pub fn log_path(&self, regime_index: usize, phase: Phase) -> PathBuf {
        self.root
            .join("logs")
            .join(format!("{}_{}.csv", phase.name(), regime_index))
    }
}

impl ActivePhase {
    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if self.writer.is_none() {
            let mut writer = csv::Writer::from_path(&self.path)?;
            writer.write_record(FrameRecord::header(self.buffer[0].positions.len()))?;
            self.writer = Some(writer);
        }
        if let Some(writer) = self.writer.as_mut() {
            for record in &self.buffer {
                writer.write_record(record.to_row())?;
            }
            writer.flush().map_err(|e| Error::io(&self.path, e))?;
        }
        debug!(rows = self.buffer.len(), path = %self.path.display(), "flushed frames");
        self.buffer.clear();
        Ok(())
    }
}

impl FrameSink for CsvTracer {
    fn begin_phase(&mut self, flush_every: usize, regime_index: usize, phase: Phase) -> Result<()> {
        self.end_phase()?;
        let logs = self.root.join("logs");
        fs::create_dir_all(&logs).map_err(|e| Error::io(&logs, e))?;
        self.active = Some(ActivePhase {
            regime_index,
            flush_every: flush_every.max(1),
            path: self.log_path(regime_index, phase),
            buffer: Vec::new(),
            writer: None,
        });
        Ok(())
    }

    fn log_frame(&mut self, step: u64, result: &StepResult) -> Result<()> {
        let active = self.active.as_mut().ok_or(Error::PhaseNotStarted)?;
        active
            .buffer
            .push(FrameRecord::from_step(active.regime_index, step, result));
        if active.buffer.len() >= active.flush_every {
            active.flush()?;
        }
        Ok(())
    }

    fn end_phase(&mut self) -> Result<()> {
        if let Some(mut active) = self.active.take() {
            active.flush()?;
        }
        Ok(())
    }
}
