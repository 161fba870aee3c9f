// Export interactor - Orchestrates the project export use case

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::domain::model::{AudioSettings, VideoSettings};
use crate::engine::{ExportLoop, ExportReport};
use crate::error::ExportResult;
use crate::output;
use crate::planner::{FrameRangeResolver, RangePolicy};
use crate::ports::{CompositorEngine, ProjectSource};
use crate::timeline;

/// Interactor for the export use case
pub struct ExportInteractor {
    project_source: Arc<dyn ProjectSource>,
    engine: Arc<dyn CompositorEngine>,
}

impl ExportInteractor {
    /// Create new export interactor with injected ports
    pub fn new(project_source: Arc<dyn ProjectSource>, engine: Arc<dyn CompositorEngine>) -> Self {
        Self {
            project_source,
            engine,
        }
    }

    /// Execute a full export: load -> timeline -> range -> writer -> loop
    pub fn execute(&self, request: ExportRequest) -> ExportResult<ExportResponse> {
        info!("Loading project: {}", request.project_path.display());
        let project = self.project_source.load(&request.project_path)?;

        let mut timeline = timeline::build_timeline(self.engine.as_ref(), &project)?;

        let resolver = FrameRangeResolver::new(request.range_policy);
        let range = resolver.resolve(&timeline.clips(), timeline.fps())?;

        let mut writer = output::configure_writer(
            self.engine.as_ref(),
            timeline.as_mut(),
            &request.output_path,
            &request.video,
            &request.audio,
            request.cache_frames,
        )?;

        let mut export_loop = ExportLoop::new();
        let report = export_loop.run(timeline.as_mut(), writer.as_mut(), range)?;

        Ok(ExportResponse {
            output_path: request.output_path,
            report,
        })
    }
}

/// Request for a project export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub project_path: PathBuf,
    pub output_path: PathBuf,
    pub video: VideoSettings,
    pub audio: AudioSettings,
    pub range_policy: RangePolicy,
    pub cache_frames: usize,
}

/// Response from a completed export
#[derive(Debug, Clone)]
pub struct ExportResponse {
    pub output_path: PathBuf,
    pub report: ExportReport,
}
