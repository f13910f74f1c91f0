use serde::{Deserialize, Serialize};

use crate::timing::Timeline;

/// Hit object type bit flags, as stored in the `.osu` type field.
pub mod object_type {
    pub const CIRCLE: u8 = 1;
    pub const SLIDER: u8 = 2;
    pub const SPINNER: u8 = 8;
    pub const MANIA_HOLD: u8 = 128;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gamemode {
    Osu,
    Taiko,
    Catch,
    Mania,
}

impl Gamemode {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Gamemode::Osu),
            1 => Some(Gamemode::Taiko),
            2 => Some(Gamemode::Catch),
            3 => Some(Gamemode::Mania),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub format_version: i32,
    pub title: String,
    pub artist: String,
    pub creator: String,
    pub version: String,
    pub beatmap_id: String,
    pub beatmapset_id: String,
    /// Composed display name, `artist - title (creator) [version]`.
    /// Filled in by post-processing.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub hp: Option<f64>,
    pub cs: f64,
    pub od: f64,
    pub ar: Option<f64>,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty {
            hp: None,
            cs: 4.0,
            od: 5.0,
            ar: None,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
        }
    }
}

/// A raw timing directive, in file order. File order is authoritative for
/// "most recent governing directive" lookups; nothing reorders this list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingPoint {
    pub offset: f64,
    /// Raw millisecond value; a beat length for uninherited points, a
    /// velocity multiplier encoding for inherited ones.
    pub beat_interval: f64,
    pub meter: i32,
    pub sample_set: i32,
    pub sample_index: i32,
    pub volume: i32,
    pub uninherited: bool,
    pub effects: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    Linear,  // L
    Bezier,  // B
    Perfect, // P
    Catmull, // C
}

impl CurveType {
    pub fn from_char(c: char) -> Self {
        match c {
            'L' => CurveType::Linear,
            'B' => CurveType::Bezier,
            'P' => CurveType::Perfect,
            'C' => CurveType::Catmull,
            _ => CurveType::Linear, // fallback
        }
    }
}

/// Resolved playable timing of a slider. Computed once, after the timing
/// pass has run; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderTiming {
    /// Time to traverse the path once, before repeats.
    pub segment_duration: f64,
    pub end_time: f64,
    /// Scroll speed along the path, in pixels per millisecond.
    pub velocity: f64,
    pub tick_times: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderData {
    pub curve_type: CurveType,
    /// Control points, with the object position prepended.
    pub control_points: Vec<(f32, f32)>,
    pub repeat: i32,
    pub pixel_length: f64,
    pub timing: Option<SliderTiming>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitObject {
    pub x: f32,
    pub y: f32,
    pub time: f64,
    pub object_type: u8,
    pub hit_sound: u8,
    /// Spinner / mania hold release time, straight from the file.
    pub end_time: Option<f64>,
    pub slider: Option<SliderData>,
    /// Mania column, filled in by column bucketing.
    pub column: Option<usize>,
}

impl HitObject {
    pub fn is_type(&self, flag: u8) -> bool {
        self.object_type & flag != 0
    }
}

#[derive(Debug, Clone)]
pub struct Beatmap {
    pub gamemode: Gamemode,
    pub metadata: Metadata,
    pub difficulty: Difficulty,
    /// Raw timing directives, in file order.
    pub timing_points: Vec<TimingPoint>,
    /// Resolved timeline derived from `timing_points`.
    pub timeline: Timeline,
    pub hit_objects: Vec<HitObject>,
}

impl Beatmap {
    /// Objects bucketed per mania column. Key count is the rounded-down
    /// CircleSize, matching how the columns were assigned.
    pub fn column_objects(&self) -> Vec<Vec<&HitObject>> {
        let columns = self.difficulty.cs.max(0.0) as usize;
        let mut buckets = vec![Vec::new(); columns];
        for obj in &self.hit_objects {
            if let Some(column) = obj.column {
                if let Some(bucket) = buckets.get_mut(column) {
                    bucket.push(obj);
                }
            }
        }
        buckets
    }
}
