//! Step callback that prints intermediate frames.

use std::io::Write;

use excitation_core::{Grid, StepCallback, StepSummary};
use tracing::warn;

use crate::render::render_ascii;

/// Prints the ASCII grid to `out` after every `every`-th step.
///
/// The callback interface cannot fail, so the first write error is kept
/// and later frames are skipped. Call [`FrameCallback::finish`] after the
/// run to surface it.
pub struct FrameCallback<W: Write> {
    out: W,
    every: u32,
    error: Option<std::io::Error>,
}

impl<W: Write> FrameCallback<W> {
    /// Print a frame every `every` steps. An interval of 0 prints nothing.
    pub const fn new(out: W, every: u32) -> Self {
        Self {
            out,
            every,
            error: None,
        }
    }

    /// Flush the writer and return the first error seen during the run.
    pub fn finish(mut self) -> Result<W, std::io::Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_frame(&mut self, summary: &StepSummary, grid: &Grid) -> Result<(), std::io::Error> {
        let number = summary.step.saturating_add(1);
        writeln!(self.out, "step {number} t={:.3}", summary.time)?;
        self.out.write_all(render_ascii(grid).as_bytes())
    }
}

impl<W: Write> StepCallback for FrameCallback<W> {
    fn on_step(&mut self, summary: &StepSummary, grid: &Grid) {
        if self.error.is_some() || self.every == 0 {
            return;
        }
        // Steps are 0-indexed; frame after steps every-1, 2*every-1, ...
        let completed = summary.step.saturating_add(1);
        if completed.checked_rem(self.every) != Some(0) {
            return;
        }
        if let Err(err) = self.write_frame(summary, grid) {
            warn!(error = %err, "Failed to write frame, suppressing further frames");
            self.error = Some(err);
        }
    }
}
