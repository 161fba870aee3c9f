// Unit tests for domain models

use super::*;

#[test]
fn test_fraction_to_f64() {
    let fps = Fraction::new(30, 1).unwrap();
    assert_eq!(fps.to_f64(), 30.0);

    let ntsc = Fraction::new(30000, 1001).unwrap();
    assert!((ntsc.to_f64() - 29.97).abs() < 0.01);
}

#[test]
fn test_fraction_zero_denominator() {
    assert!(Fraction::new(30, 0).is_err());
}

#[test]
fn test_channel_layout_from_raw() {
    assert_eq!(ChannelLayout::from_raw(3), Some(ChannelLayout::Stereo));
    assert_eq!(ChannelLayout::from_raw(4), Some(ChannelLayout::Mono));
    assert_eq!(ChannelLayout::from_raw(1599), Some(ChannelLayout::SevenPointOne));
    assert_eq!(ChannelLayout::from_raw(12345), None);
}

#[test]
fn test_channel_layout_round_trip() {
    for layout in [
        ChannelLayout::Mono,
        ChannelLayout::Stereo,
        ChannelLayout::Surround,
        ChannelLayout::FivePointOne,
        ChannelLayout::FivePointOneBack,
        ChannelLayout::SevenPointOne,
    ] {
        assert_eq!(ChannelLayout::from_raw(layout.raw()), Some(layout));
    }
}

#[test]
fn test_project_settings_validation() {
    let fps = Fraction::new(30, 1).unwrap();

    assert!(ProjectSettings::new(fps, 1280, 720, 44100, 2, ChannelLayout::Stereo).is_ok());
    assert!(ProjectSettings::new(fps, 0, 720, 44100, 2, ChannelLayout::Stereo).is_err());
    assert!(ProjectSettings::new(fps, 1280, 0, 44100, 2, ChannelLayout::Stereo).is_err());
    assert!(ProjectSettings::new(fps, 1280, 720, 0, 2, ChannelLayout::Stereo).is_err());
    assert!(ProjectSettings::new(fps, 1280, 720, 44100, 0, ChannelLayout::Stereo).is_err());
}

#[test]
fn test_video_settings_fixed_profile() {
    let settings = VideoSettings::default();
    assert_eq!(settings.codec, "libx264");
    assert_eq!(settings.width, 1280);
    assert_eq!(settings.height, 720);
    assert_eq!(settings.fps, Fraction { num: 30, den: 1 });
    assert_eq!(settings.bitrate, 15_000_000);
    assert!(!settings.interlaced);
    assert!(!settings.top_field_first);
}

#[test]
fn test_audio_settings_fixed_profile() {
    let settings = AudioSettings::default();
    assert_eq!(settings.codec, "aac");
    assert_eq!(settings.sample_rate, 48_000);
    assert_eq!(settings.channels, 2);
    assert_eq!(settings.channel_layout, ChannelLayout::Stereo);
    assert_eq!(settings.bitrate, 192_000);
}

#[test]
fn test_clip_span_extent() {
    let clip = ClipSpan {
        position: 1.5,
        duration: 2.5,
    };
    assert_eq!(clip.extent(), 4.0);
}

#[test]
fn test_frame_range_valid() {
    let range = FrameRange::new(1, 300).unwrap();
    assert_eq!(range.start(), 1);
    assert_eq!(range.end(), 300);
    assert_eq!(range.frame_count(), 300);
}

#[test]
fn test_frame_range_single_frame() {
    let range = FrameRange::new(1, 1).unwrap();
    assert_eq!(range.frame_count(), 1);
}

#[test]
fn test_frame_range_invalid() {
    assert!(FrameRange::new(0, 10).is_err());
    assert!(FrameRange::new(-5, 10).is_err());
    assert!(FrameRange::new(10, 9).is_err());
}

#[test]
fn test_blank_frame_geometry() {
    let frame = Frame::blank(7, 320, 240, 48_000, 2, 1600);
    assert_eq!(frame.index, 7);
    assert_eq!(frame.pixels.len(), 320 * 240 * 4);
    assert_eq!(frame.samples.len(), 1600 * 2);
    assert!(frame.pixels.iter().all(|&b| b == 0));
}
