//! Export range planning
//!
//! Determines the inclusive frame interval to export, either from explicit
//! constants or by scanning the clip placements the timeline surfaces.

use tracing::{debug, info};

use crate::domain::model::{ClipSpan, FrameRange, Fraction};
use crate::error::ExportResult;

/// Default testing range used when no explicit range is requested and the
/// computed policy is not in effect
pub const DEFAULT_START_FRAME: i64 = 1;
pub const DEFAULT_END_FRAME: i64 = 300;

/// How the export range is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Explicit start/end constants
    Fixed { start: i64, end: i64 },
    /// Scan clip placements for the maximum timeline extent
    Computed,
}

impl Default for RangePolicy {
    fn default() -> Self {
        RangePolicy::Computed
    }
}

/// Resolves the frame interval to export
#[derive(Debug, Clone, Default)]
pub struct FrameRangeResolver {
    policy: RangePolicy,
}

impl FrameRangeResolver {
    /// Create a resolver with the given policy
    pub fn new(policy: RangePolicy) -> Self {
        Self { policy }
    }

    /// Resolve the export range against the timeline's clips and frame rate
    pub fn resolve(&self, clips: &[ClipSpan], fps: Fraction) -> ExportResult<FrameRange> {
        let range = match self.policy {
            RangePolicy::Fixed { start, end } => FrameRange::new(start, end)?,
            RangePolicy::Computed => Self::compute_from_clips(clips, fps)?,
        };

        info!("Resolved export range {} ({} frames)", range, range.frame_count());
        Ok(range)
    }

    /// Compute the range from the maximum clip extent
    ///
    /// `end_frame = round(max(position + duration) * fps) + 1`; an empty
    /// timeline falls back to a single frame rather than an empty range.
    fn compute_from_clips(clips: &[ClipSpan], fps: Fraction) -> ExportResult<FrameRange> {
        let max_extent = clips
            .iter()
            .map(ClipSpan::extent)
            .fold(f64::NEG_INFINITY, f64::max);

        if max_extent <= 0.0 {
            debug!("No clip extent found, falling back to a single frame");
            return FrameRange::new(1, 1);
        }

        let end_frame = (max_extent * fps.to_f64()).round() as i64 + 1;
        debug!(
            "Maximum clip extent {:.3}s at {:.3} fps -> end frame {}",
            max_extent,
            fps.to_f64(),
            end_frame
        );

        FrameRange::new(1, end_frame.max(1))
    }
}

#[cfg(test)]
mod tests;
