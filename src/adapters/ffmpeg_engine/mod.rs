// FFmpeg engine adapter - CompositorEngine implementation over ffmpeg-next
//
// The orchestration layer never touches ffmpeg directly; everything below
// the port traits lives here.

use std::path::Path;
use std::sync::Arc;

use crate::domain::model::ProjectSettings;
use crate::error::{ExportError, ExportResult};
use crate::ports::{CompositorEngine, FrameWriter, HeadlessContext, RuntimeContext, Timeline};

mod timeline;
mod writer;

pub use timeline::FfmpegTimeline;
pub use writer::FfmpegFrameWriter;

/// Compositing/encoding engine backed by FFmpeg
pub struct FfmpegEngine {
    threads: usize,
    context: Arc<dyn RuntimeContext>,
}

impl FfmpegEngine {
    /// Create the engine, initializing the FFmpeg libraries
    pub fn new() -> ExportResult<Self> {
        ffmpeg_next::init().map_err(|e| ExportError::EngineError {
            message: format!("failed to initialize FFmpeg: {}", e),
        })?;

        Ok(Self {
            threads: num_cpus::get(),
            context: Arc::new(HeadlessContext),
        })
    }

    /// Set the encoder thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Supply a runtime context the engine must acquire before frame
    /// handling; the default is headless
    pub fn with_runtime_context(mut self, context: Arc<dyn RuntimeContext>) -> Self {
        self.context = context;
        self
    }
}

impl CompositorEngine for FfmpegEngine {
    fn create_timeline(&self, settings: &ProjectSettings) -> ExportResult<Box<dyn Timeline>> {
        self.context.ensure_ready()?;
        Ok(Box::new(FfmpegTimeline::new(settings.clone())))
    }

    fn create_writer(&self, path: &Path) -> ExportResult<Box<dyn FrameWriter>> {
        self.context.ensure_ready()?;
        Ok(Box::new(FfmpegFrameWriter::new(
            path.to_path_buf(),
            self.threads,
        )))
    }
}
