// Inspect interactor - Resolves project settings and range without rendering

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::ExportResult;
use crate::planner::{FrameRangeResolver, RangePolicy};
use crate::ports::{CompositorEngine, ProjectSource};
use crate::timeline;

/// Interactor for the inspect use case
pub struct InspectInteractor {
    project_source: Arc<dyn ProjectSource>,
    engine: Arc<dyn CompositorEngine>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(project_source: Arc<dyn ProjectSource>, engine: Arc<dyn CompositorEngine>) -> Self {
        Self {
            project_source,
            engine,
        }
    }

    /// Load the project, open the timeline, and report what an export
    /// would do, without writing anything
    pub fn execute(&self, request: InspectRequest) -> ExportResult<InspectReport> {
        info!("Inspecting project: {}", request.project_path.display());
        let project = self.project_source.load(&request.project_path)?;
        let settings = project.settings().clone();

        let timeline = timeline::build_timeline(self.engine.as_ref(), &project)?;
        let clips = timeline.clips();

        let resolver = FrameRangeResolver::new(RangePolicy::Computed);
        let range = resolver.resolve(&clips, timeline.fps())?;

        Ok(InspectReport {
            width: settings.width,
            height: settings.height,
            fps_num: settings.fps.num,
            fps_den: settings.fps.den,
            sample_rate: settings.sample_rate,
            channels: settings.channels,
            clip_count: clips.len(),
            start_frame: range.start(),
            end_frame: range.end(),
            frame_count: range.frame_count(),
        })
    }
}

/// Request for a project inspection
#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub project_path: PathBuf,
}

/// What an export of this project would render
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub width: u32,
    pub height: u32,
    pub fps_num: i32,
    pub fps_den: i32,
    pub sample_rate: u32,
    pub channels: u32,
    pub clip_count: usize,
    pub start_frame: i64,
    pub end_frame: i64,
    pub frame_count: i64,
}
