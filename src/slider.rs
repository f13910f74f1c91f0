//! Slider duration and tick schedule resolution.
//!
//! Runs after the timing pass: each slider looks up its governing resolved
//! timing point, derives its traversal duration and end time from the
//! tempo and velocity multiplier in force, then lays out intermediate tick
//! timestamps. Each object is independent once the timeline exists.

use crate::curve::CurveSample;
use crate::error::{BeatmapError, Result};
use crate::timing::Timeline;
use crate::types::{CurveType, Difficulty, SliderData, SliderTiming};

/// Resolves the playable timing of one slider starting at `time`.
///
/// `segment_duration` is rounded to the nearest millisecond with ties
/// away from zero (`f64::round`); `end_time` and the tick schedule are
/// built on the rounded value. Scroll velocity is path length over
/// segment duration, where path length is the pixel length for linear
/// and circular paths and the flattened curve's total distance for
/// Bezier-style ones.
///
/// Fails when no timing point governs `time`, or when the governing
/// tempo, the slider multiplier, the velocity or the tick rate would make
/// the computation divide by zero.
pub fn resolve_slider_timing(
    time: f64,
    slider: &SliderData,
    timeline: &Timeline,
    difficulty: &Difficulty,
) -> Result<SliderTiming> {
    let tp = timeline.governing_point(time)?;

    if tp.bpm == 0.0 || !tp.bpm.is_finite() {
        return Err(BeatmapError::DegenerateDivision { what: "bpm", time });
    }
    if difficulty.slider_multiplier == 0.0 {
        return Err(BeatmapError::DegenerateDivision {
            what: "slider multiplier",
            time,
        });
    }

    let segment_duration = ((-600.0 / tp.bpm) * slider.pixel_length * tp.velocity_multiplier
        / (100.0 * difficulty.slider_multiplier))
        .round();
    let end_time = time + segment_duration * slider.repeat as f64;

    // Bezier-style paths take their length from the flattened curve;
    // straight lines and circular arcs already know it.
    let path_length = match slider.curve_type {
        CurveType::Linear | CurveType::Perfect => slider.pixel_length,
        CurveType::Bezier | CurveType::Catmull => {
            CurveSample::flatten(&slider.control_points)?.total_distance as f64
        }
    };
    let velocity = path_length / segment_duration;

    let tick_times = slider_tick_times(time, end_time, velocity, difficulty)?;

    Ok(SliderTiming {
        segment_duration,
        end_time,
        velocity,
        tick_times,
    })
}

/// Lays out tick timestamps from `start_time`, stepping by
/// `(100 * slider_multiplier) / (velocity * slider_tick_rate)` while
/// strictly below `end_time`, then terminating with `end_time` itself.
///
/// The result is strictly increasing, ends exactly at `end_time`, and is
/// non-empty whenever `end_time > start_time`.
pub fn slider_tick_times(
    start_time: f64,
    end_time: f64,
    velocity: f64,
    difficulty: &Difficulty,
) -> Result<Vec<f64>> {
    if velocity == 0.0 {
        return Err(BeatmapError::DegenerateDivision {
            what: "velocity",
            time: start_time,
        });
    }
    if difficulty.slider_tick_rate == 0.0 {
        return Err(BeatmapError::DegenerateDivision {
            what: "slider tick rate",
            time: start_time,
        });
    }

    let ms_per_beat =
        (100.0 * difficulty.slider_multiplier) / (velocity * difficulty.slider_tick_rate);
    if !ms_per_beat.is_finite() || ms_per_beat <= 0.0 {
        return Err(BeatmapError::DegenerateDivision {
            what: "tick step",
            time: start_time,
        });
    }

    let mut tick_times = Vec::new();
    // start + k * step rather than repeated addition, so accumulated
    // float error can't shift late ticks.
    let mut k = 0u32;
    loop {
        let t = start_time + f64::from(k) * ms_per_beat;
        if t >= end_time {
            break;
        }
        tick_times.push(t);
        k += 1;
    }

    if tick_times.last() != Some(&end_time) {
        tick_times.push(end_time);
    }

    Ok(tick_times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimingPoint;

    fn directive(offset: f64, beat_interval: f64, uninherited: bool) -> TimingPoint {
        TimingPoint {
            offset,
            beat_interval,
            meter: 4,
            sample_set: 0,
            sample_index: 0,
            volume: 100,
            uninherited,
            effects: 0,
        }
    }

    fn slider(pixel_length: f64, repeat: i32) -> SliderData {
        SliderData {
            curve_type: CurveType::Linear,
            control_points: vec![(0.0, 0.0), (pixel_length as f32, 0.0)],
            repeat,
            pixel_length,
            timing: None,
        }
    }

    fn difficulty(sm: f64, st: f64) -> Difficulty {
        Difficulty {
            slider_multiplier: sm,
            slider_tick_rate: st,
            ..Difficulty::default()
        }
    }

    #[test]
    fn duration_from_governing_point() {
        // 120 bpm base, 0.5x velocity section starting at the object.
        let timeline = Timeline::resolve(&[
            directive(0.0, 500.0, true),
            directive(1000.0, -50.0, false),
        ]);
        let diff = difficulty(1.4, 1.0);

        let timing = resolve_slider_timing(1000.0, &slider(300.0, 1), &timeline, &diff).unwrap();

        assert_eq!(timeline.points[0].bpm, 120.0);
        assert_eq!(timeline.points[1].bpm, 120.0);
        // round((-600/120) * 300 * -50 / (100 * 1.4)) = round(535.71...)
        assert_eq!(timing.segment_duration, 536.0);
        assert_eq!(timing.end_time, 1536.0);
    }

    #[test]
    fn repeats_scale_end_time() {
        let timeline = Timeline::resolve(&[directive(0.0, 500.0, true)]);
        let diff = difficulty(1.4, 1.0);

        let once = resolve_slider_timing(0.0, &slider(140.0, 1), &timeline, &diff).unwrap();
        let thrice = resolve_slider_timing(0.0, &slider(140.0, 3), &timeline, &diff).unwrap();

        assert_eq!(once.segment_duration, thrice.segment_duration);
        assert_eq!(thrice.end_time, 3.0 * once.segment_duration);
    }

    #[test]
    fn missing_timing_point_is_an_error() {
        let empty = Timeline::resolve(&[]);
        let err = resolve_slider_timing(1000.0, &slider(300.0, 1), &empty, &difficulty(1.4, 1.0));
        assert!(matches!(err, Err(BeatmapError::MissingTimingPoint { .. })));

        // A directive after the object doesn't govern it either.
        let late = Timeline::resolve(&[directive(2000.0, 500.0, true)]);
        let err = resolve_slider_timing(1000.0, &slider(300.0, 1), &late, &difficulty(1.4, 1.0));
        assert!(matches!(err, Err(BeatmapError::MissingTimingPoint { .. })));
    }

    #[test]
    fn zero_bpm_is_an_error_not_nan() {
        // Leading inherited point leaves bpm at 0.
        let timeline = Timeline::resolve(&[directive(0.0, -50.0, false)]);
        let err = resolve_slider_timing(0.0, &slider(300.0, 1), &timeline, &difficulty(1.4, 1.0));
        assert!(matches!(
            err,
            Err(BeatmapError::DegenerateDivision { what: "bpm", .. })
        ));

        // Zero beat interval resolves to a non-finite bpm; same refusal.
        let timeline = Timeline::resolve(&[directive(0.0, 0.0, true)]);
        let err = resolve_slider_timing(0.0, &slider(300.0, 1), &timeline, &difficulty(1.4, 1.0));
        assert!(matches!(
            err,
            Err(BeatmapError::DegenerateDivision { what: "bpm", .. })
        ));
    }

    #[test]
    fn zero_slider_multiplier_is_an_error() {
        let timeline = Timeline::resolve(&[directive(0.0, 500.0, true)]);
        let err = resolve_slider_timing(0.0, &slider(300.0, 1), &timeline, &difficulty(0.0, 1.0));
        assert!(matches!(
            err,
            Err(BeatmapError::DegenerateDivision { what: "slider multiplier", .. })
        ));
    }

    #[test]
    fn ticks_increase_strictly_and_end_exactly_at_end_time() {
        let diff = difficulty(1.4, 1.0);
        let ticks = slider_tick_times(1000.0, 1536.0, 300.0 / 536.0, &diff).unwrap();

        assert!(!ticks.is_empty());
        assert_eq!(ticks[0], 1000.0);
        assert_eq!(*ticks.last().unwrap(), 1536.0);
        for pair in ticks.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn tick_step_divides_span_as_expected() {
        // step = (100 * 1.0) / (1.0 * 1.0) = 100ms over a 350ms slider:
        // 0, 100, 200, 300, then the end time.
        let ticks = slider_tick_times(0.0, 350.0, 1.0, &difficulty(1.0, 1.0)).unwrap();
        assert_eq!(ticks, vec![0.0, 100.0, 200.0, 300.0, 350.0]);
    }

    #[test]
    fn tick_landing_on_end_time_is_not_duplicated() {
        let ticks = slider_tick_times(0.0, 300.0, 1.0, &difficulty(1.0, 1.0)).unwrap();
        assert_eq!(ticks, vec![0.0, 100.0, 200.0, 300.0]);
    }

    #[test]
    fn zero_velocity_and_zero_tick_rate_are_errors() {
        assert!(matches!(
            slider_tick_times(0.0, 100.0, 0.0, &difficulty(1.4, 1.0)),
            Err(BeatmapError::DegenerateDivision { what: "velocity", .. })
        ));
        assert!(matches!(
            slider_tick_times(0.0, 100.0, 1.0, &difficulty(1.4, 0.0)),
            Err(BeatmapError::DegenerateDivision { what: "slider tick rate", .. })
        ));
    }

    #[test]
    fn curved_slider_velocity_uses_flattened_length() {
        let timeline = Timeline::resolve(&[directive(0.0, 500.0, true)]);
        let diff = difficulty(1.4, 1.0);
        let slider = SliderData {
            curve_type: CurveType::Bezier,
            control_points: vec![(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)],
            repeat: 1,
            pixel_length: 200.0,
            timing: None,
        };

        let timing = resolve_slider_timing(0.0, &slider, &timeline, &diff).unwrap();
        // Control point chord sum is 200, so velocity matches length/duration.
        let expected = 200.0 / timing.segment_duration;
        assert!((timing.velocity - expected).abs() < 1e-9);
    }
}
