use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod result;

pub use result::{
    ComboSummary, CompletedSequence, EndReason, FriendFoeSummary, RhythmSummary, SessionMode,
    SessionResult, Summary,
};

/// Seconds on the local monotonic clock or the song clock.
pub type Seconds = f64;

pub const PAD_COUNT: usize = 8;

/// One of the eight strike pads, numbered 1..=8 like the rig labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PadId(u8);

impl PadId {
    pub fn new(id: u8) -> Option<Self> {
        if (1..=PAD_COUNT as u8).contains(&id) {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index < PAD_COUNT {
            Some(Self(index as u8 + 1))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot, suitable for per-pad arrays.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn all() -> impl Iterator<Item = PadId> {
        (1..=PAD_COUNT as u8).map(PadId)
    }
}

impl TryFrom<u8> for PadId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PadId::new(value).ok_or_else(|| format!("pad id out of range 1..=8: {value}"))
    }
}

impl From<PadId> for u8 {
    fn from(pad: PadId) -> Self {
        pad.0
    }
}

impl fmt::Display for PadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beatmap {
    /// File name the beatmap was loaded from, used for the offset lookup.
    pub source: Option<String>,
    /// Calibration offset already applied to every `t_hit`.
    pub offset_s: Seconds,
    pub beats: Vec<BeatEntry>,
}

impl Beatmap {
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn last_hit_s(&self) -> Seconds {
        self.beats.iter().map(|b| b.t_hit).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeatEntry {
    pub beat_index: i64,
    pub t_hit: Seconds,
    pub pad: PadId,
}

/// Rig wiring and tuning that does not belong to a difficulty preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RigConfig {
    pub led_count: usize,
    pub poll_timeout_ms: u64,
    /// Calibration offsets keyed by beatmap file name.
    pub beatmap_offsets: BTreeMap<String, Seconds>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            led_count: 632,
            poll_timeout_ms: 10,
            beatmap_offsets: default_beatmap_offsets(),
        }
    }
}

pub fn default_beatmap_offsets() -> BTreeMap<String, Seconds> {
    BTreeMap::from([
        ("Daikirai_Beatmap.csv".to_string(), 1.73),
        ("Shape_of_You_Beatmap.csv".to_string(), 1.12),
        ("PPPP.csv".to_string(), 1.19),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_id_rejects_out_of_range() {
        assert!(PadId::new(0).is_none());
        assert!(PadId::new(9).is_none());
        assert_eq!(PadId::new(8).map(PadId::index), Some(7));
        assert_eq!(PadId::all().count(), PAD_COUNT);
    }

    #[test]
    fn pad_id_deserialization_validates_range() {
        let ok: PadId = serde_json::from_value(serde_json::json!(3)).unwrap();
        assert_eq!(ok.get(), 3);

        let bad: Result<PadId, _> = serde_json::from_value(serde_json::json!(12));
        assert!(bad.is_err());
    }

    #[test]
    fn rig_config_fills_missing_fields_with_defaults() {
        let cfg: RigConfig = serde_json::from_str(r#"{ "led_count": 24 }"#).unwrap();
        assert_eq!(cfg.led_count, 24);
        assert_eq!(cfg.poll_timeout_ms, 10);
        assert_eq!(cfg.beatmap_offsets.get("PPPP.csv"), Some(&1.19));
    }
}
