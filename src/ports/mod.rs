// Ports - Interface definitions (contracts)

use std::path::Path;

use crate::domain::model::*;
use crate::error::ExportResult;
use crate::project::Project;

/// Port for loading project documents
pub trait ProjectSource: Send + Sync {
    /// Load and validate a project from the given path
    fn load(&self, path: &Path) -> ExportResult<Project>;
}

/// Port for the external compositing/encoding engine
///
/// The engine owns everything substantive: decoding, compositing, caching,
/// encoding, muxing. This layer only drives it.
pub trait CompositorEngine: Send + Sync {
    /// Construct a timeline with the given geometry/audio parameters
    fn create_timeline(&self, settings: &ProjectSettings) -> ExportResult<Box<dyn Timeline>>;

    /// Construct a file writer for the given output path
    fn create_writer(&self, path: &Path) -> ExportResult<Box<dyn FrameWriter>>;
}

/// An engine timeline handle, queryable frame-by-frame once opened
pub trait Timeline {
    /// Reinitialize the timeline from a serialized project document
    fn load_json(&mut self, document: &str) -> ExportResult<()>;

    /// Open the timeline for reading
    ///
    /// Allocates engine-internal resources (decoders, caches) for every
    /// referenced media asset.
    fn open(&mut self) -> ExportResult<()>;

    /// Cap the composited frame size so the engine never downsamples below
    /// the requested output resolution
    fn set_max_size(&mut self, width: u32, height: u32);

    /// Supply the in-memory frame cache budget; eviction is the engine's
    fn set_cache_budget(&mut self, frames: usize);

    /// Timeline frame rate
    fn fps(&self) -> Fraction;

    /// Clip placements currently on the timeline
    fn clips(&self) -> Vec<ClipSpan>;

    /// Fetch the composited frame at the given index (1-based)
    fn frame(&mut self, index: i64) -> ExportResult<Frame>;
}

/// An engine writer handle: encoder/muxer producing the output media file
pub trait FrameWriter {
    /// Record video encoding options; applied at stream preparation
    fn set_video_options(&mut self, settings: &VideoSettings);

    /// Record audio encoding options; applied at stream preparation
    fn set_audio_options(&mut self, settings: &AudioSettings);

    /// Apply the recorded options as one atomic step
    fn prepare_streams(&mut self) -> ExportResult<()>;

    /// Open the output file for writing
    fn open(&mut self) -> ExportResult<()>;

    /// Append one frame to the output
    fn write_frame(&mut self, frame: &Frame) -> ExportResult<()>;

    /// Finalize and close the output file
    fn close(&mut self) -> ExportResult<()>;
}

/// Optional runtime capability an engine may require before frame handling
///
/// The original system satisfied this with process-wide GUI toolkit state;
/// headless engines provide a no-op.
pub trait RuntimeContext: Send + Sync {
    /// Make the runtime available, or fail if it cannot be provided
    fn ensure_ready(&self) -> ExportResult<()>;
}

/// No-op runtime context for headless operation
#[derive(Debug, Default)]
pub struct HeadlessContext;

impl RuntimeContext for HeadlessContext {
    fn ensure_ready(&self) -> ExportResult<()> {
        Ok(())
    }
}
