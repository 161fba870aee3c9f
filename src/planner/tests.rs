// Unit tests for export range planning

use super::*;

fn fps30() -> Fraction {
    Fraction::new(30, 1).unwrap()
}

fn clip(position: f64, duration: f64) -> ClipSpan {
    ClipSpan { position, duration }
}

#[test]
fn test_fixed_policy() {
    let resolver = FrameRangeResolver::new(RangePolicy::Fixed { start: 1, end: 300 });
    let range = resolver.resolve(&[], fps30()).unwrap();
    assert_eq!(range.start(), 1);
    assert_eq!(range.end(), 300);
}

#[test]
fn test_fixed_policy_rejects_inverted_range() {
    let resolver = FrameRangeResolver::new(RangePolicy::Fixed { start: 10, end: 5 });
    assert!(resolver.resolve(&[], fps30()).is_err());
}

#[test]
fn test_computed_single_clip() {
    // One clip at position 0 with duration 2.0s at 30 fps -> [1, 61]
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    let range = resolver.resolve(&[clip(0.0, 2.0)], fps30()).unwrap();
    assert_eq!(range.start(), 1);
    assert_eq!(range.end(), 61);
    assert_eq!(range.frame_count(), 61);
}

#[test]
fn test_computed_takes_maximum_extent() {
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    let clips = [clip(0.0, 2.0), clip(5.0, 1.0), clip(1.0, 3.0)];
    // max extent is 5.0 + 1.0 = 6.0s -> 181
    let range = resolver.resolve(&clips, fps30()).unwrap();
    assert_eq!(range.end(), 181);
}

#[test]
fn test_computed_empty_timeline_falls_back_to_single_frame() {
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    let range = resolver.resolve(&[], fps30()).unwrap();
    assert_eq!(range.start(), 1);
    assert_eq!(range.end(), 1);
    assert!(range.frame_count() >= 1);
}

#[test]
fn test_computed_zero_duration_clip_at_origin() {
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    let range = resolver.resolve(&[clip(0.0, 0.0)], fps30()).unwrap();
    assert!(range.frame_count() >= 1);
}

#[test]
fn test_computed_monotone_in_duration() {
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    let mut previous = 0;
    for tenths in 1..=50 {
        let duration = tenths as f64 / 10.0;
        let range = resolver.resolve(&[clip(2.0, duration)], fps30()).unwrap();
        assert!(range.end() >= previous, "end frame must not decrease");
        previous = range.end();
    }
}

#[test]
fn test_computed_ntsc_rate_rounds() {
    let fps = Fraction::new(30000, 1001).unwrap();
    let resolver = FrameRangeResolver::new(RangePolicy::Computed);
    // 2.0s * 29.97 = 59.94 -> rounds to 60, plus one frame of margin
    let range = resolver.resolve(&[clip(0.0, 2.0)], fps).unwrap();
    assert_eq!(range.end(), 61);
}
