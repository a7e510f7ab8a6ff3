use serde::{Deserialize, Serialize};

use crate::{PadId, Seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Combo,
    FriendFoe,
    Rhythm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TimeUp,
    OutOfLives,
    PlaybackEnded,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: SessionMode,
    pub tier: u8,
    pub ended_by: EndReason,
    pub elapsed_s: Seconds,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Summary {
    Combo(ComboSummary),
    FriendFoe(FriendFoeSummary),
    Rhythm(RhythmSummary),
}

/// One fully replicated preview sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSequence {
    pub first_hit_s: Seconds,
    pub total_time_s: Seconds,
    pub sequence: Vec<PadId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboSummary {
    pub score: u32,
    pub lives_left: u32,
    /// Mean reaction time (tier 1) or mean time-to-first-hit (tiers 2-4).
    pub reaction_time_s: Option<Seconds>,
    pub hits_per_sec: f64,
    pub highest_streak: u32,
    pub longest_combo: usize,
    #[serde(default)]
    pub completed: Vec<CompletedSequence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendFoeSummary {
    pub score: u32,
    pub lives_left: u32,
    pub hits: u32,
    pub bonus_hits: u32,
    pub friend_spared: u32,
    pub friend_hit: u32,
    pub foe_missed: u32,
    pub foe_reaction_s: Option<Seconds>,
    pub hits_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmSummary {
    pub score: u32,
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub late: u32,
    pub miss: u32,
    pub max_combo: u32,
    pub total_beats: usize,
    pub mean_latency_s: Option<Seconds>,
    pub hits_per_sec: f64,
    /// Fraction of the maximum attainable score, 0.0..=1.0.
    pub accuracy: f64,
}

impl SessionResult {
    /// Fixed result lines captured by the session orchestrator.
    pub fn result_lines(&self) -> Vec<String> {
        match &self.summary {
            Summary::Combo(s) => vec![
                format!("G1 Score = {}", s.score),
                format!("G1 Reaction Time = {}", fmt_opt(s.reaction_time_s)),
                format!("G1 Punch Speed = {:.4}", s.hits_per_sec),
                format!("G1 Highest Combo Streak = {}", s.highest_streak),
                format!("G1 Longest Combo = {}", s.longest_combo),
            ],
            Summary::FriendFoe(s) => vec![
                format!("G2 Score = {}", s.score),
                format!("G2 Lives Left = {}", s.lives_left),
                format!("G2 Hits = {}", s.hits),
                format!("G2 Friend Spared = {}", s.friend_spared),
                format!("G2 Friend Hit = {}", s.friend_hit),
                format!("G2 Foe Missed = {}", s.foe_missed),
                format!("G2 RT Avg = {}", fmt_opt(s.foe_reaction_s)),
                format!("G2 Punch Speed = {:.4}", s.hits_per_sec),
            ],
            Summary::Rhythm(s) => vec![
                format!("G3 Score = {}", s.score),
                format!("G3 Perfect/Great = {} / {}", s.perfect, s.great),
                format!("G3 Good/Late/Miss = {} / {} / {}", s.good, s.late, s.miss),
                format!("G3 Max Combo = {}", s.max_combo),
                format!("G3 Avg RT = {}", fmt_opt(s.mean_latency_s)),
                format!("G3 Punch Speed = {:.2}", s.hits_per_sec),
                format!("G3 Accuracy = {:.2}%", s.accuracy * 100.0),
            ],
        }
    }
}

fn fmt_opt(v: Option<Seconds>) -> String {
    match v {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}
