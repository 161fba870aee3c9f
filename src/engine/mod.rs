//! Export loop
//!
//! Drives the frame-by-frame render: fetch each composited frame from the
//! timeline in ascending order and hand it unmodified to the writer. The
//! loop is strictly sequential and fail-fast; a partial output file is left
//! on disk as-is.

use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::domain::model::FrameRange;
use crate::error::{ExportError, ExportResult};
use crate::ports::{FrameWriter, Timeline};

/// Export loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Not yet started
    Idle,
    /// Frames are being read and written
    Rendering,
    /// All frames written and the writer closed
    Closed,
    /// A frame fetch or write aborted the export
    Failed,
}

/// Summary of a completed export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub frames_written: i64,
    pub elapsed: Duration,
}

/// Sequential frame-by-frame export driver
#[derive(Debug)]
pub struct ExportLoop {
    phase: ExportPhase,
}

impl ExportLoop {
    pub fn new() -> Self {
        Self {
            phase: ExportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Render every frame in the range, then close the writer
    ///
    /// Frame N+1 is not requested until frame N has been consumed by the
    /// writer. The writer is closed only after the full range succeeds.
    pub fn run(
        &mut self,
        timeline: &mut dyn Timeline,
        writer: &mut dyn FrameWriter,
        range: FrameRange,
    ) -> ExportResult<ExportReport> {
        let started = Instant::now();
        self.phase = ExportPhase::Rendering;
        info!(
            "Rendering frames {} through {} ({} total)",
            range.start(),
            range.end(),
            range.frame_count()
        );

        let mut frames_written = 0i64;
        for index in range.start()..=range.end() {
            let frame = match timeline.frame(index) {
                Ok(frame) => frame,
                Err(e) => {
                    self.phase = ExportPhase::Failed;
                    error!("Frame fetch failed at {}: {}", index, e);
                    return Err(ExportError::FrameReadFailed {
                        frame: index,
                        message: e.to_string(),
                    });
                }
            };

            if let Err(e) = writer.write_frame(&frame) {
                self.phase = ExportPhase::Failed;
                error!("Frame write failed at {}: {}", index, e);
                return Err(ExportError::FrameWriteFailed {
                    frame: index,
                    message: e.to_string(),
                });
            }

            frames_written += 1;
            debug!("Processed frame {}", index);
        }

        if let Err(e) = writer.close() {
            self.phase = ExportPhase::Failed;
            error!("Failed to finalize output: {}", e);
            return Err(e);
        }

        self.phase = ExportPhase::Closed;
        let elapsed = started.elapsed();
        info!(
            "Export complete: {} frames in {:.2}s",
            frames_written,
            elapsed.as_secs_f64()
        );

        Ok(ExportReport {
            frames_written,
            elapsed,
        })
    }
}

impl Default for ExportLoop {
    fn default() -> Self {
        Self::new()
    }
}
