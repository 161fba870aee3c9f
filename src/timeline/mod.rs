//! Timeline construction
//!
//! Translates the stored project settings plus the raw document into the
//! engine call sequence that yields an opened, readable timeline.

use tracing::info;

use crate::error::ExportResult;
use crate::ports::{CompositorEngine, Timeline};
use crate::project::Project;

/// Build and open an engine timeline for the given project
///
/// The timeline is fully initialized by the JSON load; opening it allocates
/// engine-internal resources for every referenced media asset, and an
/// unresolvable asset surfaces as `MediaNotFound` unchanged.
pub fn build_timeline(
    engine: &dyn CompositorEngine,
    project: &Project,
) -> ExportResult<Box<dyn Timeline>> {
    let settings = project.settings();
    info!(
        "Constructing timeline: {}x{} at {} fps, {} Hz {} ch",
        settings.width, settings.height, settings.fps, settings.sample_rate, settings.channels
    );

    let mut timeline = engine.create_timeline(settings)?;

    let document = project.to_json_string()?;
    timeline.load_json(&document)?;
    timeline.open()?;

    info!("Timeline opened, {} clips placed", timeline.clips().len());
    Ok(timeline)
}
