//! `.osu` file parsing and the load pipeline.
//!
//! Parsing splits the file into sections and decodes fields; resolution
//! then runs in order: timing points first, slider durations and tick
//! schedules for osu!standard, column bucketing for osu!mania, and
//! finally the post-processing defaults.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::{BeatmapError, Result};
use crate::slider::resolve_slider_timing;
use crate::timing::Timeline;
use crate::types::{
    object_type, Beatmap, CurveType, Difficulty, Gamemode, HitObject, Metadata, SliderData,
    TimingPoint,
};

/// Loads and fully resolves a beatmap file.
pub fn parse_beatmap<P: AsRef<Path>>(path: P) -> Result<Beatmap> {
    let content = fs::read_to_string(path)?;
    parse_beatmap_str(&content)
}

/// Loads and fully resolves a beatmap from its file contents.
///
/// A resolution error for any slider aborts the load; callers that prefer
/// to skip the offending object can run
/// [`resolve_slider_timing`](crate::slider::resolve_slider_timing)
/// themselves on a partially built map.
pub fn parse_beatmap_str(content: &str) -> Result<Beatmap> {
    let mut lines = content.lines();

    let mut metadata = Metadata::default();
    metadata.format_version = lines
        .next()
        .and_then(|line| {
            line.trim_start_matches('\u{feff}')
                .split("osu file format v")
                .nth(1)
        })
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(-1);

    // Collect section bodies, then decode each one.
    let mut sections: HashMap<String, Vec<String>> = HashMap::new();
    let mut current_section = String::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].to_string();
            sections.entry(current_section.clone()).or_default();
        } else if !current_section.is_empty() {
            if let Some(section) = sections.get_mut(&current_section) {
                section.push(line.to_string());
            }
        }
    }

    let mut gamemode = Gamemode::Osu;
    if let Some(general_lines) = sections.get("General") {
        for line in general_lines {
            if let Some((key, value)) = line.split_once(':') {
                if key.trim() == "Mode" {
                    let raw = value.trim().parse().unwrap_or(0);
                    gamemode =
                        Gamemode::from_raw(raw).ok_or(BeatmapError::UnsupportedGamemode(raw))?;
                }
            }
        }
    }

    if let Some(metadata_lines) = sections.get("Metadata") {
        parse_metadata_section(metadata_lines, &mut metadata);
    }

    let mut difficulty = Difficulty::default();
    if let Some(difficulty_lines) = sections.get("Difficulty") {
        parse_difficulty_section(difficulty_lines, &mut difficulty);
    }

    let mut timing_points = Vec::new();
    if let Some(timing_lines) = sections.get("TimingPoints") {
        for line in timing_lines {
            match parse_timing_point(line) {
                Some(tp) => timing_points.push(tp),
                None => warn!("skipping malformed timing point line: {line}"),
            }
        }
    }

    let mut hit_objects = Vec::new();
    if let Some(hitobject_lines) = sections.get("HitObjects") {
        for line in hitobject_lines {
            match parse_hit_object(line, gamemode)? {
                Some(obj) => hit_objects.push(obj),
                None => warn!("skipping malformed hit object line: {line}"),
            }
        }
    }

    // Resolution passes. Timing always runs and never partially fails;
    // slider resolution can, and surfaces that to the caller.
    let timeline = Timeline::resolve(&timing_points);

    if gamemode == Gamemode::Osu {
        for obj in &mut hit_objects {
            if !obj.is_type(object_type::SLIDER) {
                continue;
            }
            if let Some(slider) = &mut obj.slider {
                let timing = resolve_slider_timing(obj.time, slider, &timeline, &difficulty)?;
                slider.timing = Some(timing);
            }
        }
    }

    if gamemode == Gamemode::Mania {
        let columns = difficulty.cs.max(1.0) as usize;
        for obj in &mut hit_objects {
            obj.column = Some(mania_column(obj.x, columns));
        }
    }

    post_process(&mut metadata, &mut difficulty);

    debug!(
        "loaded '{}': {} timing points, {} hit objects",
        metadata.name,
        timing_points.len(),
        hit_objects.len()
    );

    Ok(Beatmap {
        gamemode,
        metadata,
        difficulty,
        timing_points,
        timeline,
        hit_objects,
    })
}

fn parse_metadata_section(lines: &[String], metadata: &mut Metadata) {
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "Title" => metadata.title = value.to_string(),
                "Artist" => metadata.artist = value.to_string(),
                "Creator" => metadata.creator = value.to_string(),
                "Version" => metadata.version = value.to_string(),
                "BeatmapID" => metadata.beatmap_id = value.to_string(),
                "BeatmapSetID" => metadata.beatmapset_id = value.to_string(),
                _ => {}
            }
        }
    }
}

fn parse_difficulty_section(lines: &[String], difficulty: &mut Difficulty) {
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "HPDrainRate" => difficulty.hp = value.parse().ok(),
                "CircleSize" => difficulty.cs = value.parse().unwrap_or(4.0),
                "OverallDifficulty" => difficulty.od = value.parse().unwrap_or(5.0),
                "ApproachRate" => difficulty.ar = value.parse().ok(),
                "SliderMultiplier" => difficulty.slider_multiplier = value.parse().unwrap_or(1.4),
                "SliderTickRate" => difficulty.slider_tick_rate = value.parse().unwrap_or(1.0),
                _ => {}
            }
        }
    }
}

/// Decodes one timing point line. Lines with fewer than two fields, or
/// with non-numeric offset or beat interval, are malformed and skipped by
/// the caller.
fn parse_timing_point(line: &str) -> Option<TimingPoint> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        return None;
    }

    let offset = parts[0].trim().parse().ok()?;
    let beat_interval = parts[1].trim().parse().ok()?;
    // Old maps don't carry a meter field.
    let meter = if parts.len() > 2 { parts[2].parse().unwrap_or(4) } else { 4 };
    let sample_set = if parts.len() > 3 { parts[3].parse().unwrap_or(0) } else { 0 };
    let sample_index = if parts.len() > 4 { parts[4].parse().unwrap_or(0) } else { 0 };
    let volume = if parts.len() > 5 { parts[5].parse().unwrap_or(100) } else { 100 };
    let uninherited = if parts.len() > 6 { parts[6] == "1" } else { true };
    let effects = if parts.len() > 7 { parts[7].parse().unwrap_or(0) } else { 0 };

    Some(TimingPoint {
        offset,
        beat_interval,
        meter,
        sample_set,
        sample_index,
        volume,
        uninherited,
        effects,
    })
}

/// Decodes one hit object line for the map's gamemode. Returns `Ok(None)`
/// for malformed lines (skipped), and an error for object types that the
/// gamemode does not define.
fn parse_hit_object(line: &str, gamemode: Gamemode) -> Result<Option<HitObject>> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return Ok(None);
    }

    let (Ok(x), Ok(y), Ok(time), Ok(ty)) = (
        parts[0].parse::<f32>(),
        parts[1].parse::<f32>(),
        parts[2].parse::<f64>(),
        parts[3].parse::<u8>(),
    ) else {
        return Ok(None);
    };
    let hit_sound = if parts.len() > 4 { parts[4].parse().unwrap_or(0) } else { 0 };

    let mut obj = HitObject {
        x,
        y,
        time,
        object_type: ty,
        hit_sound,
        end_time: None,
        slider: None,
        column: None,
    };

    match gamemode {
        Gamemode::Osu => {
            if obj.is_type(object_type::SLIDER) {
                match parts.get(5) {
                    Some(_) => obj.slider = Some(parse_slider_data(&parts, x, y)),
                    None => return Ok(None),
                }
            } else if obj.is_type(object_type::SPINNER) {
                obj.end_time = parts.get(5).and_then(|v| v.parse().ok());
            } else if !obj.is_type(object_type::CIRCLE) {
                return Err(BeatmapError::UnexpectedHitObject {
                    mode: "osu!",
                    object_type: ty,
                });
            }
        }
        Gamemode::Mania => {
            if obj.is_type(object_type::MANIA_HOLD) {
                // Extras field is `endtime:hitsound...`.
                obj.end_time = parts
                    .get(5)
                    .and_then(|v| v.split(':').next())
                    .and_then(|v| v.parse().ok());
            } else if !obj.is_type(object_type::CIRCLE) {
                return Err(BeatmapError::UnexpectedHitObject {
                    mode: "osu!mania",
                    object_type: ty,
                });
            }
        }
        Gamemode::Taiko => return Err(BeatmapError::UnsupportedGamemode(1)),
        Gamemode::Catch => return Err(BeatmapError::UnsupportedGamemode(2)),
    }

    Ok(Some(obj))
}

fn parse_slider_data(parts: &[&str], x: f32, y: f32) -> SliderData {
    let slider_parts: Vec<&str> = parts[5].split('|').collect();
    let curve_type = CurveType::from_char(slider_parts[0].chars().next().unwrap_or('L'));

    // Control points, with the object position prepended.
    let mut control_points = vec![(x, y)];
    for part in &slider_parts[1..] {
        if let Some((px, py)) = part.split_once(':') {
            if let (Ok(px), Ok(py)) = (px.parse(), py.parse()) {
                control_points.push((px, py));
            }
        }
    }

    let repeat = if parts.len() > 6 { parts[6].parse().unwrap_or(1) } else { 1 };
    let pixel_length = if parts.len() > 7 { parts[7].parse().unwrap_or(100.0) } else { 100.0 };

    SliderData {
        curve_type,
        control_points,
        repeat,
        pixel_length,
        timing: None,
    }
}

/// Column for an object at `x` on a `columns`-key layout; the playfield
/// is 512 osu!pixels wide.
fn mania_column(x: f32, columns: usize) -> usize {
    let column = (x * columns as f32 / 512.0).floor() as isize;
    column.clamp(0, columns as isize - 1) as usize
}

fn post_process(metadata: &mut Metadata, difficulty: &mut Difficulty) {
    // Old file formats have no AR; it (and a missing HP) falls back to OD.
    if difficulty.ar.is_none() {
        difficulty.ar = Some(difficulty.od);
    }
    if difficulty.hp.is_none() {
        difficulty.hp = Some(difficulty.od);
    }

    metadata.name = format!(
        "{} - {} ({}) [{}]",
        metadata.artist, metadata.title, metadata.creator, metadata.version
    );
}
