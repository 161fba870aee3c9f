// FFmpeg-backed frame writer
//
// Encoder/muxer producing one video and one audio stream. Options are
// recorded by the setters and applied as one step by prepare_streams; the
// file header is written by open and the trailer by close.

use std::path::PathBuf;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::channel_layout::ChannelLayout as AvChannelLayout;
use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::{Pixel, Sample};
use ffmpeg_next::Rational;
use tracing::{debug, info};

use crate::domain::model::{AudioSettings, ChannelLayout, Frame, VideoSettings};
use crate::error::{ExportError, ExportResult};
use crate::ports::FrameWriter;

/// Engine writer handle over the FFmpeg encoder/muxer path
pub struct FfmpegFrameWriter {
    path: PathBuf,
    threads: usize,
    video: Option<VideoSettings>,
    audio: Option<AudioSettings>,
    state: Option<MuxerState>,
    opened: bool,
    closed: bool,
}

impl FfmpegFrameWriter {
    pub fn new(path: PathBuf, threads: usize) -> Self {
        Self {
            path,
            threads,
            video: None,
            audio: None,
            state: None,
            opened: false,
            closed: false,
        }
    }
}

impl FrameWriter for FfmpegFrameWriter {
    fn set_video_options(&mut self, settings: &VideoSettings) {
        self.video = Some(settings.clone());
    }

    fn set_audio_options(&mut self, settings: &AudioSettings) {
        self.audio = Some(settings.clone());
    }

    fn prepare_streams(&mut self) -> ExportResult<()> {
        if self.state.is_some() {
            return Err(ExportError::EngineError {
                message: "streams already prepared".to_string(),
            });
        }
        let video = self.video.clone().ok_or_else(|| ExportError::EngineError {
            message: "video options not set".to_string(),
        })?;
        let audio = self.audio.clone().ok_or_else(|| ExportError::EngineError {
            message: "audio options not set".to_string(),
        })?;

        self.state = Some(MuxerState::prepare(&self.path, &video, &audio, self.threads)?);
        Ok(())
    }

    fn open(&mut self) -> ExportResult<()> {
        let state = self.state.as_mut().ok_or_else(|| ExportError::EngineError {
            message: "streams not prepared".to_string(),
        })?;
        state.write_header(&self.path)?;
        self.opened = true;
        info!("Output file opened: {}", self.path.display());
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> ExportResult<()> {
        if !self.opened || self.closed {
            return Err(ExportError::EngineError {
                message: "writer is not open".to_string(),
            });
        }
        let state = self.state.as_mut().unwrap();
        state.encode_video(frame)?;
        state.encode_audio(frame)?;
        Ok(())
    }

    fn close(&mut self) -> ExportResult<()> {
        if !self.opened || self.closed {
            return Err(ExportError::EngineError {
                message: "writer is not open".to_string(),
            });
        }
        let state = self.state.as_mut().unwrap();
        state.finish()?;
        self.closed = true;
        info!("Output file closed: {}", self.path.display());
        Ok(())
    }
}

/// Open muxer plus its two encoders and conversion state
struct MuxerState {
    output: ffmpeg::format::context::Output,
    video_encoder: ffmpeg::encoder::Video,
    audio_encoder: ffmpeg::encoder::Audio,
    video_stream: usize,
    audio_stream: usize,
    video_time_base: Rational,
    audio_time_base: Rational,
    scaler: Option<ffmpeg::software::scaling::Context>,
    scaler_geometry: Option<(u32, u32)>,
    resampler: Option<ffmpeg::software::resampling::Context>,
    resampler_spec: Option<(u32, u32)>,
    sample_format: Sample,
    sample_rate: u32,
    channel_layout: AvChannelLayout,
    channels: u32,
    frame_size: usize,
    sample_buffer: Vec<i16>,
    video_pts: i64,
    audio_pts: i64,
}

impl MuxerState {
    fn prepare(
        path: &std::path::Path,
        video: &VideoSettings,
        audio: &AudioSettings,
        threads: usize,
    ) -> ExportResult<Self> {
        let video_codec = ffmpeg::encoder::find_by_name(&video.codec).ok_or_else(|| {
            ExportError::UnsupportedCodec {
                codec: video.codec.clone(),
            }
        })?;
        let audio_codec = ffmpeg::encoder::find_by_name(&audio.codec).ok_or_else(|| {
            ExportError::UnsupportedCodec {
                codec: audio.codec.clone(),
            }
        })?;

        let mut output =
            ffmpeg::format::output(&path).map_err(|e| ExportError::OutputOpenFailed {
                message: format!("failed to create {}: {}", path.display(), e),
            })?;
        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

        // Video stream
        let pixel_format = video_codec
            .video()
            .ok()
            .and_then(|v| v.formats())
            .and_then(|mut formats| formats.next())
            .unwrap_or(Pixel::YUV420P);

        let video_time_base = Rational::new(video.fps.den, video.fps.num);
        let mut video_stream =
            output
                .add_stream(video_codec)
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to add video stream: {}", e),
                })?;
        let video_stream_index = video_stream.index();

        let mut encoder = ffmpeg::codec::context::Context::new_with_codec(video_codec)
            .encoder()
            .video()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to create video encoder: {}", e),
            })?;
        encoder.set_width(video.width);
        encoder.set_height(video.height);
        encoder.set_format(pixel_format);
        encoder.set_time_base(video_time_base);
        encoder.set_frame_rate(Some(Rational::new(video.fps.num, video.fps.den)));
        encoder.set_aspect_ratio(Rational::new(video.pixel_ratio.num, video.pixel_ratio.den));
        encoder.set_bit_rate(video.bitrate as usize);
        if global_header {
            encoder.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
        }

        let mut options = ffmpeg::Dictionary::new();
        options.set("threads", &threads.to_string());
        let video_encoder = encoder
            .open_with(options)
            .map_err(|e| ExportError::UnsupportedCodec {
                codec: format!("{}: {}", video.codec, e),
            })?;
        video_stream.set_parameters(&video_encoder);

        // Audio stream
        let sample_format = audio_codec
            .audio()
            .ok()
            .and_then(|a| a.formats())
            .and_then(|mut formats| formats.next())
            .unwrap_or(Sample::F32(SampleType::Planar));
        let channel_layout = map_channel_layout(audio.channel_layout);
        let audio_time_base = Rational::new(1, audio.sample_rate as i32);

        let mut audio_stream =
            output
                .add_stream(audio_codec)
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to add audio stream: {}", e),
                })?;
        let audio_stream_index = audio_stream.index();

        let mut encoder = ffmpeg::codec::context::Context::new_with_codec(audio_codec)
            .encoder()
            .audio()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to create audio encoder: {}", e),
            })?;
        encoder.set_rate(audio.sample_rate as i32);
        encoder.set_channel_layout(channel_layout);
        encoder.set_format(sample_format);
        encoder.set_bit_rate(audio.bitrate as usize);
        encoder.set_time_base(audio_time_base);
        if global_header {
            encoder.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
        }

        let audio_encoder =
            encoder
                .open()
                .map_err(|e| ExportError::UnsupportedCodec {
                    codec: format!("{}: {}", audio.codec, e),
                })?;
        audio_stream.set_parameters(&audio_encoder);

        let frame_size = audio_encoder.frame_size() as usize;

        debug!(
            "Streams prepared: video {} {:?}, audio {} {:?} frame_size {}",
            video.codec, pixel_format, audio.codec, sample_format, frame_size
        );

        Ok(Self {
            output,
            video_encoder,
            audio_encoder,
            video_stream: video_stream_index,
            audio_stream: audio_stream_index,
            video_time_base,
            audio_time_base,
            scaler: None,
            scaler_geometry: None,
            resampler: None,
            resampler_spec: None,
            sample_format,
            sample_rate: audio.sample_rate,
            channel_layout,
            channels: audio.channels,
            frame_size,
            sample_buffer: Vec::new(),
            video_pts: 0,
            audio_pts: 0,
        })
    }

    fn write_header(&mut self, path: &std::path::Path) -> ExportResult<()> {
        self.output
            .write_header()
            .map_err(|e| ExportError::OutputOpenFailed {
                message: format!("failed to write header for {}: {}", path.display(), e),
            })
    }

    /// Encode one video frame from RGBA pixels
    fn encode_video(&mut self, frame: &Frame) -> ExportResult<()> {
        let mut rgba =
            ffmpeg::util::frame::video::Video::new(Pixel::RGBA, frame.width, frame.height);
        let row_bytes = (frame.width * 4) as usize;
        let stride = rgba.stride(0);
        {
            let data = rgba.data_mut(0);
            for row in 0..frame.height as usize {
                let src = row * row_bytes;
                let dst = row * stride;
                data[dst..dst + row_bytes].copy_from_slice(&frame.pixels[src..src + row_bytes]);
            }
        }

        if self.scaler_geometry != Some((frame.width, frame.height)) {
            self.scaler = Some(
                ffmpeg::software::scaling::Context::get(
                    Pixel::RGBA,
                    frame.width,
                    frame.height,
                    self.video_encoder.format(),
                    self.video_encoder.width(),
                    self.video_encoder.height(),
                    ffmpeg::software::scaling::Flags::BILINEAR,
                )
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to create scaler: {}", e),
                })?,
            );
            self.scaler_geometry = Some((frame.width, frame.height));
        }

        let mut converted = ffmpeg::util::frame::video::Video::new(
            self.video_encoder.format(),
            self.video_encoder.width(),
            self.video_encoder.height(),
        );
        self.scaler
            .as_mut()
            .unwrap()
            .run(&rgba, &mut converted)
            .map_err(|e| ExportError::EngineError {
                message: format!("scaling failed: {}", e),
            })?;

        converted.set_pts(Some(self.video_pts));
        self.video_pts += 1;

        self.video_encoder
            .send_frame(&converted)
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to send frame to encoder: {}", e),
            })?;
        self.drain_video_packets()
    }

    /// Buffer one frame's audio block and emit encoder-sized chunks
    fn encode_audio(&mut self, frame: &Frame) -> ExportResult<()> {
        let samples = self.convert_to_output_spec(frame)?;
        self.sample_buffer.extend_from_slice(&samples);

        let chunk = if self.frame_size > 0 {
            self.frame_size
        } else {
            // PCM-style codecs accept arbitrary frame sizes
            self.sample_buffer.len() / self.channels.max(1) as usize
        };
        if chunk == 0 {
            return Ok(());
        }

        while self.sample_buffer.len() >= chunk * self.channels as usize {
            let block: Vec<i16> = self
                .sample_buffer
                .drain(..chunk * self.channels as usize)
                .collect();
            self.emit_audio_block(&block, chunk)?;
        }
        Ok(())
    }

    /// Bring an incoming audio block to the output rate and layout
    fn convert_to_output_spec(&mut self, frame: &Frame) -> ExportResult<Vec<i16>> {
        if frame.sample_rate == self.sample_rate && frame.channels == self.channels {
            return Ok(frame.samples.clone());
        }

        let src_layout = layout_for_channels(frame.channels);
        let spec = (frame.sample_rate, frame.channels);
        if self.resampler_spec != Some(spec) {
            self.resampler = Some(
                ffmpeg::software::resampler(
                    (Sample::I16(SampleType::Packed), src_layout, frame.sample_rate),
                    (
                        Sample::I16(SampleType::Packed),
                        self.channel_layout,
                        self.sample_rate,
                    ),
                )
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to create resampler: {}", e),
                })?,
            );
            self.resampler_spec = Some(spec);
        }

        let in_samples = frame.samples.len() / frame.channels.max(1) as usize;
        let mut input = ffmpeg::util::frame::audio::Audio::new(
            Sample::I16(SampleType::Packed),
            in_samples,
            src_layout,
        );
        input.set_rate(frame.sample_rate);
        input.plane_mut::<i16>(0)[..frame.samples.len()].copy_from_slice(&frame.samples);

        // Worst-case output size for this input block
        let out_capacity = (in_samples as u64 * self.sample_rate as u64
            / frame.sample_rate.max(1) as u64) as usize
            + 64;
        let mut output = ffmpeg::util::frame::audio::Audio::new(
            Sample::I16(SampleType::Packed),
            out_capacity,
            self.channel_layout,
        );
        output.set_rate(self.sample_rate);

        self.resampler
            .as_mut()
            .unwrap()
            .run(&input, &mut output)
            .map_err(|e| ExportError::EngineError {
                message: format!("resampling failed: {}", e),
            })?;

        let produced = output.samples() * self.channels as usize;
        Ok(output.plane::<i16>(0)[..produced].to_vec())
    }

    /// Convert one interleaved i16 chunk to the encoder sample format and
    /// send it
    fn emit_audio_block(&mut self, block: &[i16], samples: usize) -> ExportResult<()> {
        let channels = self.channels as usize;
        let mut out = ffmpeg::util::frame::audio::Audio::new(
            self.sample_format,
            samples,
            self.channel_layout,
        );
        out.set_rate(self.sample_rate);

        match self.sample_format {
            Sample::I16(SampleType::Packed) => {
                out.plane_mut::<i16>(0)[..block.len()].copy_from_slice(block);
            }
            Sample::I16(SampleType::Planar) => {
                for ch in 0..channels {
                    let plane = out.plane_mut::<i16>(ch);
                    for (i, sample) in plane.iter_mut().take(samples).enumerate() {
                        *sample = block[i * channels + ch];
                    }
                }
            }
            Sample::F32(SampleType::Packed) => {
                let plane = out.plane_mut::<f32>(0);
                for (i, sample) in plane.iter_mut().take(block.len()).enumerate() {
                    *sample = block[i] as f32 / 32768.0;
                }
            }
            Sample::F32(SampleType::Planar) => {
                for ch in 0..channels {
                    let plane = out.plane_mut::<f32>(ch);
                    for (i, sample) in plane.iter_mut().take(samples).enumerate() {
                        *sample = block[i * channels + ch] as f32 / 32768.0;
                    }
                }
            }
            other => {
                return Err(ExportError::EngineError {
                    message: format!("unsupported encoder sample format {:?}", other),
                });
            }
        }

        out.set_pts(Some(self.audio_pts));
        self.audio_pts += samples as i64;

        self.audio_encoder
            .send_frame(&out)
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to send audio frame: {}", e),
            })?;
        self.drain_audio_packets()
    }

    fn drain_video_packets(&mut self) -> ExportResult<()> {
        let stream_time_base = self
            .output
            .stream(self.video_stream)
            .map(|s| s.time_base())
            .unwrap_or(self.video_time_base);

        let mut packet = ffmpeg::Packet::empty();
        while self.video_encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.video_stream);
            packet.rescale_ts(self.video_time_base, stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to write video packet: {}", e),
                })?;
        }
        Ok(())
    }

    fn drain_audio_packets(&mut self) -> ExportResult<()> {
        let stream_time_base = self
            .output
            .stream(self.audio_stream)
            .map(|s| s.time_base())
            .unwrap_or(self.audio_time_base);

        let mut packet = ffmpeg::Packet::empty();
        while self.audio_encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.audio_stream);
            packet.rescale_ts(self.audio_time_base, stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| ExportError::EngineError {
                    message: format!("failed to write audio packet: {}", e),
                })?;
        }
        Ok(())
    }

    /// Flush both encoders and write the trailer
    fn finish(&mut self) -> ExportResult<()> {
        // Emit any buffered samples as a final short frame
        if !self.sample_buffer.is_empty() {
            let samples = self.sample_buffer.len() / self.channels.max(1) as usize;
            if samples > 0 {
                let block: Vec<i16> = self.sample_buffer.drain(..).collect();
                self.emit_audio_block(&block, samples)?;
            }
        }

        self.video_encoder
            .send_eof()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to flush video encoder: {}", e),
            })?;
        self.drain_video_packets()?;

        self.audio_encoder
            .send_eof()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to flush audio encoder: {}", e),
            })?;
        self.drain_audio_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| ExportError::EngineError {
                message: format!("failed to write trailer: {}", e),
            })
    }
}

/// Map the engine's layout enumeration to FFmpeg's
fn map_channel_layout(layout: ChannelLayout) -> AvChannelLayout {
    match layout {
        ChannelLayout::Mono => AvChannelLayout::MONO,
        ChannelLayout::Stereo => AvChannelLayout::STEREO,
        ChannelLayout::Surround => AvChannelLayout::SURROUND,
        ChannelLayout::FivePointOne => AvChannelLayout::_5POINT1,
        ChannelLayout::FivePointOneBack => AvChannelLayout::_5POINT1_BACK,
        ChannelLayout::SevenPointOne => AvChannelLayout::_7POINT1,
    }
}

/// Default FFmpeg layout for a raw channel count
fn layout_for_channels(channels: u32) -> AvChannelLayout {
    match channels {
        1 => AvChannelLayout::MONO,
        2 => AvChannelLayout::STEREO,
        3 => AvChannelLayout::SURROUND,
        6 => AvChannelLayout::_5POINT1_BACK,
        8 => AvChannelLayout::_7POINT1,
        n => AvChannelLayout::default(n as i32),
    }
}
