//! Export configuration
//!
//! Optional TOML file overriding the fixed export profile. Absent keys fall
//! back to the defaults; unknown keys are rejected.

use std::path::Path;

use serde::Deserialize;

use crate::domain::model::{AudioSettings, ChannelLayout, Fraction, VideoSettings};
use crate::error::{ExportError, ExportResult};
use crate::output::DEFAULT_CACHE_FRAMES;

/// Parsed export configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default)]
    pub video: VideoOverrides,
    #[serde(default)]
    pub audio: AudioOverrides,
    #[serde(default)]
    pub export: ExportOverrides,
}

/// `[video]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoOverrides {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps_num: Option<i32>,
    pub fps_den: Option<i32>,
}

/// `[audio]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioOverrides {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub channel_layout: Option<u64>,
}

/// `[export]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportOverrides {
    pub cache_frames: Option<usize>,
    pub threads: Option<usize>,
}

impl ExportConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExportError::ConfigError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| ExportError::ConfigError {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Produce the effective video settings: fixed profile plus overrides
    pub fn video_settings(&self) -> ExportResult<VideoSettings> {
        let mut settings = VideoSettings::default();
        if let Some(codec) = &self.video.codec {
            settings.codec = codec.clone();
        }
        if let Some(bitrate) = self.video.bitrate {
            settings.bitrate = bitrate;
        }
        if let Some(width) = self.video.width {
            settings.width = width;
        }
        if let Some(height) = self.video.height {
            settings.height = height;
        }
        if self.video.fps_num.is_some() || self.video.fps_den.is_some() {
            let num = self.video.fps_num.unwrap_or(settings.fps.num);
            let den = self.video.fps_den.unwrap_or(settings.fps.den);
            settings.fps = Fraction::new(num, den).map_err(|_| ExportError::ConfigError {
                message: "fps_den cannot be zero".to_string(),
            })?;
        }
        if settings.width == 0 || settings.height == 0 {
            return Err(ExportError::ConfigError {
                message: "output dimensions cannot be zero".to_string(),
            });
        }
        Ok(settings)
    }

    /// Produce the effective audio settings: fixed profile plus overrides
    pub fn audio_settings(&self) -> ExportResult<AudioSettings> {
        let mut settings = AudioSettings::default();
        if let Some(codec) = &self.audio.codec {
            settings.codec = codec.clone();
        }
        if let Some(bitrate) = self.audio.bitrate {
            settings.bitrate = bitrate;
        }
        if let Some(sample_rate) = self.audio.sample_rate {
            settings.sample_rate = sample_rate;
        }
        if let Some(channels) = self.audio.channels {
            settings.channels = channels;
        }
        if let Some(raw) = self.audio.channel_layout {
            settings.channel_layout =
                ChannelLayout::from_raw(raw).ok_or_else(|| ExportError::ConfigError {
                    message: format!("unrecognized channel layout code {}", raw),
                })?;
        }
        Ok(settings)
    }

    /// Frame cache budget for the engine
    pub fn cache_frames(&self) -> usize {
        self.export.cache_frames.unwrap_or(DEFAULT_CACHE_FRAMES)
    }

    /// Encoder thread count; defaults to the available CPUs
    pub fn threads(&self) -> usize {
        self.export.threads.unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_yields_fixed_profile() {
        let config: ExportConfig = toml::from_str("").unwrap();
        let video = config.video_settings().unwrap();
        let audio = config.audio_settings().unwrap();
        assert_eq!(video, VideoSettings::default());
        assert_eq!(audio, AudioSettings::default());
        assert_eq!(config.cache_frames(), DEFAULT_CACHE_FRAMES);
    }

    #[test]
    fn test_video_overrides() {
        let config: ExportConfig = toml::from_str(
            r#"
            [video]
            codec = "libx265"
            bitrate = 8000000
            width = 1920
            height = 1080
            fps_num = 25
            "#,
        )
        .unwrap();
        let video = config.video_settings().unwrap();
        assert_eq!(video.codec, "libx265");
        assert_eq!(video.bitrate, 8_000_000);
        assert_eq!(video.width, 1920);
        assert_eq!(video.height, 1080);
        assert_eq!(video.fps, Fraction { num: 25, den: 1 });
    }

    #[test]
    fn test_audio_layout_override() {
        let config: ExportConfig = toml::from_str(
            r#"
            [audio]
            channel_layout = 4
            channels = 1
            "#,
        )
        .unwrap();
        let audio = config.audio_settings().unwrap();
        assert_eq!(audio.channel_layout, ChannelLayout::Mono);
        assert_eq!(audio.channels, 1);
    }

    #[test]
    fn test_bad_layout_rejected() {
        let config: ExportConfig = toml::from_str("[audio]\nchannel_layout = 99\n").unwrap();
        assert!(config.audio_settings().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: Result<ExportConfig, _> = toml::from_str("[video]\ncrf = 23\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_fps_den_rejected() {
        let config: ExportConfig = toml::from_str("[video]\nfps_den = 0\n").unwrap();
        assert!(config.video_settings().is_err());
    }
}
