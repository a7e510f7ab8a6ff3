use std::{collections::BTreeMap, fs, path::Path};

use rig_schema::{default_beatmap_offsets, BeatEntry, Beatmap, Seconds};
use tracing::debug;

mod error;
mod parser;

#[cfg(test)]
mod tests;

pub use error::{CompileError, CompileErrorKind};

use parser::parse_rows;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// File name used to look up the calibration offset.
    pub source_name: Option<String>,
    pub offsets: BTreeMap<String, Seconds>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_name: None,
            offsets: default_beatmap_offsets(),
        }
    }
}

impl CompileOptions {
    pub fn offset_s(&self) -> Seconds {
        self.source_name
            .as_ref()
            .and_then(|name| self.offsets.get(name))
            .copied()
            .unwrap_or(0.0)
    }
}

pub fn compile_file(path: impl AsRef<Path>) -> Result<Beatmap, CompileError> {
    compile_file_with_offsets(path, default_beatmap_offsets())
}

pub fn compile_file_with_offsets(
    path: impl AsRef<Path>,
    offsets: BTreeMap<String, Seconds>,
) -> Result<Beatmap, CompileError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|e| {
        CompileError::new("E2001", format!("failed to read beatmap: {e}"), 0)
            .with_file(path.display().to_string())
    })?;
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    compile_str_with_options(&src, CompileOptions { source_name, offsets })
        .map_err(|e| e.with_file(path.display().to_string()))
}

pub fn compile_str(src: &str) -> Result<Beatmap, CompileError> {
    compile_str_with_options(src, CompileOptions::default())
}

pub fn compile_str_with_options(src: &str, options: CompileOptions) -> Result<Beatmap, CompileError> {
    let rows = parse_rows(src)?;
    let offset_s = options.offset_s();

    let mut beats: Vec<BeatEntry> = rows
        .into_iter()
        .map(|row| BeatEntry {
            beat_index: row.beat_index,
            t_hit: (row.time_s + offset_s).max(0.0),
            pad: row.pad,
        })
        .collect();

    // Stable sort keeps file order for simultaneous beats.
    beats.sort_by(|a, b| a.t_hit.total_cmp(&b.t_hit));

    debug!(
        beats = beats.len(),
        offset_s,
        source = options.source_name.as_deref().unwrap_or("<inline>"),
        "compiled beatmap"
    );

    Ok(Beatmap {
        source: options.source_name,
        offset_s,
        beats,
    })
}
