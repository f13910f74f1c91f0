//! Resolves textual osu! beatmaps into in-memory timelines: parsed
//! metadata and hit objects, resolved tempo and velocity per timing
//! point, and per-slider durations, velocities and tick schedules.
//!
//! ```no_run
//! let beatmap = beatmap_reader::parse_beatmap("map.osu")?;
//! println!("{} ({}..{} bpm)", beatmap.metadata.name, beatmap.timeline.bpm_min, beatmap.timeline.bpm_max);
//! # Ok::<(), beatmap_reader::BeatmapError>(())
//! ```

pub mod beatmap;
pub mod curve;
pub mod error;
pub mod slider;
pub mod timing;
pub mod types;

pub use beatmap::{parse_beatmap, parse_beatmap_str};
pub use curve::CurveSample;
pub use error::BeatmapError;
pub use timing::{ResolvedTimingPoint, Timeline};
pub use types::*;
