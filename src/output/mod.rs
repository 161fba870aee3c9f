//! Output writer configuration
//!
//! Prepares the engine's file writer for the export: caps the timeline's
//! composited frame size at the output resolution, supplies the frame cache
//! budget, and applies the video/audio options as one atomic step before
//! opening the file.

use std::path::Path;

use tracing::info;

use crate::domain::model::{AudioSettings, VideoSettings};
use crate::error::ExportResult;
use crate::ports::{CompositorEngine, FrameWriter, Timeline};

/// Frame cache budget handed to the engine for the duration of the export
pub const DEFAULT_CACHE_FRAMES: usize = 500;

/// Configure and open a writer ready to accept frames
///
/// `set_max_size` is applied with exactly the configured output dimensions
/// before stream preparation so the engine never downsamples below the
/// requested resolution.
pub fn configure_writer(
    engine: &dyn CompositorEngine,
    timeline: &mut dyn Timeline,
    output_path: &Path,
    video: &VideoSettings,
    audio: &AudioSettings,
    cache_frames: usize,
) -> ExportResult<Box<dyn FrameWriter>> {
    timeline.set_max_size(video.width, video.height);
    timeline.set_cache_budget(cache_frames);

    info!(
        "Configuring writer: {} -> {} {}x{} @ {} bps, {} {} Hz {} ch @ {} bps",
        output_path.display(),
        video.codec,
        video.width,
        video.height,
        video.bitrate,
        audio.codec,
        audio.sample_rate,
        audio.channels,
        audio.bitrate
    );

    let mut writer = engine.create_writer(output_path)?;
    writer.set_video_options(video);
    writer.set_audio_options(audio);
    writer.prepare_streams()?;
    writer.open()?;

    info!("Writer opened: {}", output_path.display());
    Ok(writer)
}
