//! Disk-backed load test: write a small map out and read it back through
//! the full pipeline.

use std::io::Write;

use beatmap_reader::{object_type, parse_beatmap, Gamemode};

const MAP: &str = "osu file format v14

[General]
Mode: 0

[Metadata]
Title:Integration
Artist:Artist
Creator:Creator
Version:Normal

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:6
ApproachRate:8
SliderMultiplier:1.4
SliderTickRate:2

[TimingPoints]
0,500,4,2,0,100,1,0
4000,-50,4,2,0,100,0,0

[HitObjects]
100,100,500,1,0,0:0:0:0:
256,192,1000,2,0,B|300:250|350:150|400:192,2,200
200,200,5000,2,0,L|500:200,1,300
";

fn main_map() -> beatmap_reader::Beatmap {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(MAP.as_bytes()).expect("write map");
    parse_beatmap(file.path()).expect("load map")
}

#[test]
fn loads_from_disk_and_resolves_sliders() {
    let beatmap = main_map();

    assert_eq!(beatmap.gamemode, Gamemode::Osu);
    assert_eq!(
        beatmap.metadata.name,
        "Artist - Integration (Creator) [Normal]"
    );
    assert_eq!(beatmap.timeline.bpm_min, 120.0);
    assert_eq!(beatmap.timeline.bpm_max, 120.0);
    assert_eq!(beatmap.difficulty.ar, Some(8.0));

    for obj in &beatmap.hit_objects {
        if obj.is_type(object_type::SLIDER) {
            let timing = obj
                .slider
                .as_ref()
                .and_then(|s| s.timing.as_ref())
                .expect("slider timing resolved");

            assert!(timing.end_time > obj.time);
            assert_eq!(*timing.tick_times.last().unwrap(), timing.end_time);
            for pair in timing.tick_times.windows(2) {
                assert!(pair[1] > pair[0]);
            }
        }
    }
}

#[test]
fn repeat_and_velocity_sections_shape_end_times() {
    let beatmap = main_map();

    // First slider: 1x section, 200px, 2 repeats.
    // segment = round((-600/120) * 200 * -100 / (100 * 1.4)) = 714
    let first = beatmap.hit_objects[1].slider.as_ref().unwrap();
    let timing = first.timing.as_ref().unwrap();
    assert_eq!(timing.segment_duration, 714.0);
    assert_eq!(timing.end_time, 1000.0 + 2.0 * 714.0);

    // Second slider sits in the 0.5x section, so it takes twice as long
    // per pixel: round((-600/120) * 300 * -50 / (100 * 1.4)) = 536.
    let second = beatmap.hit_objects[2].slider.as_ref().unwrap();
    let timing = second.timing.as_ref().unwrap();
    assert_eq!(timing.segment_duration, 536.0);
    assert_eq!(timing.end_time, 5536.0);
}
