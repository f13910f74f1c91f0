//! Error types for beatmap loading and timeline resolution.
//!
//! Resolution errors are unrecoverable for the object being processed but
//! are surfaced to the caller, which decides whether to abort the whole
//! load or skip the offending object.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BeatmapError {
    #[error("failed to read beatmap file: {0}")]
    Io(#[from] std::io::Error),

    /// No timing point exists at or before the given time. Every hit
    /// object must be preceded by at least one timing directive.
    #[error("no timing point governs time {time}ms")]
    MissingTimingPoint { time: f64 },

    /// A duration or tick computation would divide by zero (or by a
    /// non-finite value left behind by a degenerate timing directive).
    #[error("degenerate {what} while resolving slider at {time}ms")]
    DegenerateDivision { what: &'static str, time: f64 },

    /// Curve flattening needs at least two control points.
    #[error("curve has {count} control points, need at least 2")]
    DegenerateCurve { count: usize },

    #[error("unexpected {mode} hit object type: {object_type}")]
    UnexpectedHitObject { mode: &'static str, object_type: u8 },

    #[error("gamemode {0} is not supported")]
    UnsupportedGamemode(u8),
}

pub type Result<T> = std::result::Result<T, BeatmapError>;
