// FFmpeg-backed timeline
//
// Minimal frame provider: decodes the topmost clip active at each frame
// instant, scaled to the render geometry, with silence-padded audio blocks
// and blank frames where nothing is scheduled. Layered compositing and
// effects are not provided by this adapter.

use std::path::{Path, PathBuf};

use ffmpeg_next as ffmpeg;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::model::{ClipSpan, Fraction, Frame, ProjectSettings};
use crate::error::{ExportError, ExportResult};
use crate::ports::Timeline;

/// A clip placement parsed from the project document
#[derive(Debug, Clone)]
struct TimelineClip {
    path: PathBuf,
    position: f64,
    start: f64,
    duration: f64,
    layer: i64,
}

impl TimelineClip {
    fn contains(&self, instant: f64) -> bool {
        instant >= self.position && instant < self.position + self.duration
    }
}

/// Timeline handle decoding clip frames on demand
pub struct FfmpegTimeline {
    settings: ProjectSettings,
    clips: Vec<TimelineClip>,
    loaded: bool,
    opened: bool,
    max_size: Option<(u32, u32)>,
    cache_frames: usize,
    active: Option<ClipDecoder>,
    last_pixels: Option<Vec<u8>>,
}

impl FfmpegTimeline {
    pub fn new(settings: ProjectSettings) -> Self {
        Self {
            settings,
            clips: Vec::new(),
            loaded: false,
            opened: false,
            max_size: None,
            cache_frames: 0,
            active: None,
            last_pixels: None,
        }
    }

    /// Render geometry: the project size, capped by the configured maximum
    fn render_size(&self) -> (u32, u32) {
        match self.max_size {
            Some((mw, mh)) => (self.settings.width.min(mw), self.settings.height.min(mh)),
            None => (self.settings.width, self.settings.height),
        }
    }

    /// Audio samples carried by one video frame
    fn samples_per_frame(&self) -> usize {
        let fps = self.settings.fps.to_f64();
        (self.settings.sample_rate as f64 / fps).round() as usize
    }

    /// Topmost clip active at the given instant
    fn active_clip_at(&self, instant: f64) -> Option<usize> {
        self.clips
            .iter()
            .enumerate()
            .filter(|(_, clip)| clip.contains(instant))
            .max_by(|(_, a), (_, b)| {
                a.layer
                    .cmp(&b.layer)
                    .then(a.position.partial_cmp(&b.position).unwrap_or(std::cmp::Ordering::Equal))
            })
            .map(|(index, _)| index)
    }

    fn parse_clip(entry: &Value) -> ExportResult<TimelineClip> {
        let path = entry
            .get("reader")
            .and_then(|reader| reader.get("path"))
            .and_then(Value::as_str)
            .ok_or_else(|| ExportError::InvalidProjectFormat {
                message: "clip is missing its reader path".to_string(),
            })?;

        let position = entry.get("position").and_then(Value::as_f64).unwrap_or(0.0);
        let start = entry.get("start").and_then(Value::as_f64).unwrap_or(0.0);
        let duration = match entry.get("end").and_then(Value::as_f64) {
            Some(end) => (end - start).max(0.0),
            None => entry.get("duration").and_then(Value::as_f64).unwrap_or(0.0),
        };
        let layer = entry.get("layer").and_then(Value::as_i64).unwrap_or(0);

        Ok(TimelineClip {
            path: PathBuf::from(path),
            position,
            start,
            duration,
            layer,
        })
    }
}

impl Timeline for FfmpegTimeline {
    fn load_json(&mut self, document: &str) -> ExportResult<()> {
        let parsed: Value =
            serde_json::from_str(document).map_err(|e| ExportError::InvalidProjectFormat {
                message: format!("malformed timeline document: {}", e),
            })?;

        let mut clips = Vec::new();
        if let Some(entries) = parsed.get("clips").and_then(Value::as_array) {
            for entry in entries {
                clips.push(Self::parse_clip(entry)?);
            }
        }

        debug!("Timeline document loaded: {} clips", clips.len());
        self.clips = clips;
        self.loaded = true;
        Ok(())
    }

    fn open(&mut self) -> ExportResult<()> {
        if !self.loaded {
            return Err(ExportError::TimelineOpenFailed {
                message: "no project document loaded".to_string(),
            });
        }

        for clip in &self.clips {
            if !clip.path.exists() {
                return Err(ExportError::MediaNotFound {
                    path: clip.path.display().to_string(),
                });
            }
        }

        self.opened = true;
        Ok(())
    }

    fn set_max_size(&mut self, width: u32, height: u32) {
        self.max_size = Some((width, height));
    }

    fn set_cache_budget(&mut self, frames: usize) {
        self.cache_frames = frames;
    }

    fn fps(&self) -> Fraction {
        self.settings.fps
    }

    fn clips(&self) -> Vec<ClipSpan> {
        self.clips
            .iter()
            .map(|clip| ClipSpan {
                position: clip.position,
                duration: clip.duration,
            })
            .collect()
    }

    fn frame(&mut self, index: i64) -> ExportResult<Frame> {
        if !self.opened {
            return Err(ExportError::EngineError {
                message: "timeline is not open".to_string(),
            });
        }

        let fps = self.settings.fps.to_f64();
        let instant = (index - 1) as f64 / fps;
        let (width, height) = self.render_size();
        let samples_per_frame = self.samples_per_frame();

        let Some(clip_index) = self.active_clip_at(instant) else {
            return Ok(Frame::blank(
                index,
                width,
                height,
                self.settings.sample_rate,
                self.settings.channels,
                samples_per_frame,
            ));
        };

        let clip = &self.clips[clip_index];
        let source_time = clip.start + (instant - clip.position);

        // Reuse the decoder while walking forward through the same clip
        let needs_new = match &self.active {
            Some(decoder) => decoder.clip_index != clip_index,
            None => true,
        };
        if needs_new {
            self.active = Some(ClipDecoder::open(&clip.path, clip_index, width, height)?);
        }

        let decoder = self.active.as_mut().unwrap();
        let pixels = match decoder.read_at(source_time, fps)? {
            Some(pixels) => {
                self.last_pixels = Some(pixels.clone());
                pixels
            }
            // Source exhausted: hold the last decoded image
            None => match &self.last_pixels {
                Some(pixels) => pixels.clone(),
                None => vec![0; (width * height * 4) as usize],
            },
        };

        Ok(Frame {
            index,
            width,
            height,
            pixels,
            samples: vec![0; samples_per_frame * self.settings.channels as usize],
            sample_rate: self.settings.sample_rate,
            channels: self.settings.channels,
        })
    }
}

/// Sequential decoder over one clip's video stream
struct ClipDecoder {
    clip_index: usize,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::codec::decoder::Video,
    stream_index: usize,
    time_base: f64,
    scaler: Option<ffmpeg::software::scaling::Context>,
    target_width: u32,
    target_height: u32,
    last_time: f64,
    at_eof: bool,
}

impl ClipDecoder {
    fn open(path: &Path, clip_index: usize, width: u32, height: u32) -> ExportResult<Self> {
        let input = ffmpeg::format::input(&path).map_err(|_| ExportError::MediaNotFound {
            path: path.display().to_string(),
        })?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| ExportError::EngineError {
                message: format!("no video stream in {}", path.display()),
            })?;
        let stream_index = stream.index();
        let time_base = f64::from(stream.time_base());

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to create decoder context: {}", e),
            })?
            .decoder()
            .video()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to create video decoder: {}", e),
            })?;

        Ok(Self {
            clip_index,
            input,
            decoder,
            stream_index,
            time_base,
            scaler: None,
            target_width: width,
            target_height: height,
            last_time: f64::NEG_INFINITY,
            at_eof: false,
        })
    }

    /// Decode forward until the frame covering `source_time`, returning its
    /// RGBA pixels, or `None` once the source is exhausted
    fn read_at(&mut self, source_time: f64, output_fps: f64) -> ExportResult<Option<Vec<u8>>> {
        let half_frame = 0.5 / output_fps;

        // Walking backwards means a seek and a decoder flush
        if source_time < self.last_time - half_frame {
            let target = (source_time * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
            self.input
                .seek(target, ..target)
                .map_err(|e| ExportError::EngineError {
                    message: format!("seek failed: {}", e),
                })?;
            self.decoder.flush();
            self.at_eof = false;
            self.last_time = f64::NEG_INFINITY;
        }

        if self.at_eof {
            return self.drain_one(source_time, half_frame);
        }

        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        loop {
            let mut got_packet = false;
            for (stream, packet) in self.input.packets() {
                got_packet = true;
                if stream.index() != self.stream_index {
                    continue;
                }
                self.decoder
                    .send_packet(&packet)
                    .map_err(|e| ExportError::EngineError {
                        message: format!("failed to send packet to decoder: {}", e),
                    })?;
                break;
            }

            if !got_packet {
                // End of file: flush the decoder and keep draining
                self.decoder
                    .send_eof()
                    .map_err(|e| ExportError::EngineError {
                        message: format!("failed to flush decoder: {}", e),
                    })?;
                self.at_eof = true;
                return self.drain_one(source_time, half_frame);
            }

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let frame_time = decoded.pts().unwrap_or(0) as f64 * self.time_base;
                self.last_time = frame_time;
                if frame_time >= source_time - half_frame {
                    return Ok(Some(self.convert(&decoded)?));
                }
            }
        }
    }

    /// Pull remaining frames out of a flushed decoder
    fn drain_one(&mut self, source_time: f64, half_frame: f64) -> ExportResult<Option<Vec<u8>>> {
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let frame_time = decoded.pts().unwrap_or(0) as f64 * self.time_base;
            self.last_time = frame_time;
            if frame_time >= source_time - half_frame {
                return Ok(Some(self.convert(&decoded)?));
            }
        }
        Ok(None)
    }

    /// Scale and convert a decoded frame to RGBA at the target geometry
    fn convert(
        &mut self,
        decoded: &ffmpeg::util::frame::video::Video,
    ) -> ExportResult<Vec<u8>> {
        if self.scaler.is_none() {
            self.scaler = Some(
                ffmpeg::software::scaling::Context::get(
                    decoded.format(),
                    decoded.width(),
                    decoded.height(),
                    ffmpeg::format::Pixel::RGBA,
                    self.target_width,
                    self.target_height,
                    ffmpeg::software::scaling::Flags::BILINEAR,
                )
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to create scaler: {}", e),
                })?,
            );
        }

        let mut rgba = ffmpeg::util::frame::video::Video::new(
            ffmpeg::format::Pixel::RGBA,
            self.target_width,
            self.target_height,
        );
        self.scaler
            .as_mut()
            .unwrap()
            .run(decoded, &mut rgba)
            .map_err(|e| ExportError::EngineError {
                message: format!("scaling failed: {}", e),
            })?;

        // Copy row by row; the plane stride can exceed the row width
        let row_bytes = (self.target_width * 4) as usize;
        let stride = rgba.stride(0);
        let data = rgba.data(0);
        let mut pixels = Vec::with_capacity(row_bytes * self.target_height as usize);
        for row in 0..self.target_height as usize {
            let offset = row * stride;
            pixels.extend_from_slice(&data[offset..offset + row_bytes]);
        }
        if pixels.len() != row_bytes * self.target_height as usize {
            warn!("short frame data from scaler");
        }
        Ok(pixels)
    }
}
