use std::collections::BTreeMap;

use rig_schema::{Beatmap, PAD_COUNT};

/// Prints one row per distinct hit time with the struck pads marked.
pub fn print_timeline(map: &Beatmap) {
    for line in timeline_lines(map) {
        println!("{line}");
    }
}

pub fn timeline_lines(map: &Beatmap) -> Vec<String> {
    let mut lines = Vec::new();
    let source = map.source.as_deref().unwrap_or("<inline>");
    lines.push(format!(
        "Beatmap {source}: {} beats, offset {:+.2}s, last hit {:.3}s",
        map.len(),
        map.offset_s,
        map.last_hit_s()
    ));

    if map.is_empty() {
        lines.push("Beatmap is empty.".to_string());
        return lines;
    }

    lines.push("Time(s)  | 1 2 3 4 5 6 7 8 | Beats".to_string());
    lines.push("---------|-----------------|------".to_string());

    // Group by millisecond so float noise does not split a chord.
    let mut rows: BTreeMap<i64, ([char; PAD_COUNT], Vec<i64>)> = BTreeMap::new();
    for beat in &map.beats {
        let key = (beat.t_hit * 1000.0).round() as i64;
        let (pads, indices) = rows.entry(key).or_insert((['.'; PAD_COUNT], Vec::new()));
        pads[beat.pad.index()] = 'N';
        indices.push(beat.beat_index);
    }

    for (ms, (pads, indices)) in rows {
        let pad_str = pads
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let beat_str = indices
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        lines.push(format!("{:8.3} | {} | {}", ms as f64 / 1000.0, pad_str, beat_str));
    }
    lines
}
