//! Timing point resolution.
//!
//! A single forward pass over the raw timing directives threads the tempo
//! state: uninherited points set a new bpm and base beat length, inherited
//! points keep the tempo and only change the velocity multiplier. Every
//! resolved point records the bpm and multiplier current at the time it is
//! processed. Later values genuinely depend on earlier state, so this pass
//! is strictly sequential.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BeatmapError, Result};
use crate::types::TimingPoint;

/// Canonical "1x velocity" sentinel, the raw encoding of an unmodified
/// slider speed.
const DEFAULT_VELOCITY_MULTIPLIER: f64 = -100.0;

/// A timing point with its tempo state resolved. Raw directives are left
/// untouched; these are derived values, one per directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTimingPoint {
    pub offset: f64,
    pub meter: i32,
    pub uninherited: bool,
    /// Effective beat length in ms. For inherited points this is the beat
    /// interval of the most recent uninherited point.
    pub beat_length: f64,
    /// Tempo set by the most recent uninherited point. Zero if no
    /// uninherited point has occurred yet; non-finite if that point
    /// carried a zero beat interval. Consumers that divide by this must
    /// check it.
    pub bpm: f64,
    /// Raw velocity multiplier encoding, `-100` meaning 1x.
    pub velocity_multiplier: f64,
}

/// Resolved timeline: one point per raw directive, in file order, plus the
/// tempo range across uninherited points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub points: Vec<ResolvedTimingPoint>,
    /// `+inf` when no uninherited directive exists; callers must treat
    /// that as "undefined".
    pub bpm_min: f64,
    /// `-inf` when no uninherited directive exists.
    pub bpm_max: f64,
}

impl Timeline {
    /// Resolves the raw directive sequence. Never fails: every directive
    /// yields a point, even a degenerate one (bpm 0 ahead of the first
    /// uninherited directive); division errors are deferred to the
    /// consumers that actually divide by the resolved values.
    pub fn resolve(timing_points: &[TimingPoint]) -> Timeline {
        let mut bpm_min = f64::INFINITY;
        let mut bpm_max = f64::NEG_INFINITY;

        let mut bpm = 0.0;
        let mut velocity_multiplier = DEFAULT_VELOCITY_MULTIPLIER;
        let mut last_negative_interval = DEFAULT_VELOCITY_MULTIPLIER;
        let mut base_beat_length = 0.0;

        let mut points = Vec::with_capacity(timing_points.len());

        for tp in timing_points {
            let beat_length;

            if tp.uninherited {
                // A zero interval leaves a non-finite bpm behind; the
                // point is still emitted and consumers reject it.
                bpm = 60000.0 / tp.beat_interval;
                beat_length = tp.beat_interval;
                base_beat_length = tp.beat_interval;
                velocity_multiplier = DEFAULT_VELOCITY_MULTIPLIER;

                bpm_min = bpm_min.min(bpm);
                bpm_max = bpm_max.max(bpm);
            } else {
                beat_length = base_beat_length;

                if tp.beat_interval < 0.0 {
                    velocity_multiplier = tp.beat_interval;
                    last_negative_interval = tp.beat_interval;
                } else {
                    // Non-negative raw value repeats the previous
                    // multiplier.
                    velocity_multiplier = last_negative_interval;
                }
            }

            points.push(ResolvedTimingPoint {
                offset: tp.offset,
                meter: tp.meter,
                uninherited: tp.uninherited,
                beat_length,
                bpm,
                velocity_multiplier,
            });
        }

        debug!(
            "resolved {} timing points, bpm {}..{}",
            points.len(),
            bpm_min,
            bpm_max
        );

        Timeline {
            points,
            bpm_min,
            bpm_max,
        }
    }

    /// Finds the governing timing point for `time`: the one with the
    /// greatest offset at or before it. Offsets are non-decreasing by
    /// construction, so a binary search is enough.
    pub fn governing_point(&self, time: f64) -> Result<&ResolvedTimingPoint> {
        let idx = self.points.partition_point(|tp| tp.offset <= time);
        if idx == 0 {
            return Err(BeatmapError::MissingTimingPoint { time });
        }
        Ok(&self.points[idx - 1])
    }
}
