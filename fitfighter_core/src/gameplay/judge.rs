use std::collections::VecDeque;

use rig_schema::{BeatEntry, PAD_COUNT};

use crate::led::color::{Color, GOLD, GOOD_VIOLET, GREAT_GREEN, RED};
use crate::{PadId, Seconds};

/// Number of rotating palette layers per pad.
pub const LAYERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgment {
    Perfect,
    Great,
    Good,
    Late,
    Miss,
}

impl Judgment {
    pub fn points(self) -> u32 {
        match self {
            Judgment::Perfect => 3,
            Judgment::Great => 2,
            Judgment::Good => 1,
            Judgment::Late | Judgment::Miss => 0,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Judgment::Perfect => GOLD,
            Judgment::Great => GREAT_GREEN,
            Judgment::Good => GOOD_VIOLET,
            Judgment::Late | Judgment::Miss => RED,
        }
    }
}

/// Timing windows in seconds. `perfect`, `great` and `good` are half-widths
/// around the hit time; `late_cutoff` only applies after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgeWindows {
    pub perfect: Seconds,
    pub great: Seconds,
    pub good: Seconds,
    pub late_cutoff: Seconds,
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self {
            perfect: 0.040,
            great: 0.090,
            good: 0.150,
            late_cutoff: 0.220,
        }
    }
}

impl JudgeWindows {
    /// Classifies `dt = song_time - t_hit`. `None` means the press is outside
    /// every window and leaves the note alone.
    pub fn judge(&self, dt: Seconds) -> Option<Judgment> {
        let abs = dt.abs();
        if abs <= self.perfect {
            Some(Judgment::Perfect)
        } else if abs <= self.great {
            Some(Judgment::Great)
        } else if abs <= self.good {
            Some(Judgment::Good)
        } else if (0.0..=self.late_cutoff).contains(&dt) {
            Some(Judgment::Late)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmNote {
    pub beat_index: i64,
    pub pad: PadId,
    pub t_appear: Seconds,
    pub t_hit: Seconds,
    /// Palette layer, 0..LAYERS.
    pub layer: usize,
}

impl RhythmNote {
    pub fn from_beat(beat: &BeatEntry, lead: Seconds) -> Self {
        Self {
            beat_index: beat.beat_index,
            pad: beat.pad,
            t_appear: (beat.t_hit - lead).max(0.0),
            t_hit: beat.t_hit,
            layer: 0,
        }
    }

    /// Approach progress in 0..=1. Notes with no approach span never fill.
    pub fn progress(&self, song_t: Seconds) -> f64 {
        let span = self.t_hit - self.t_appear;
        if span <= 0.0 {
            return 0.0;
        }
        ((song_t - self.t_appear) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentResult {
    pub note: RhythmNote,
    pub judgment: Judgment,
    pub delta: Seconds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome {
    Judged(JudgmentResult),
    /// A note is active on the pad but the press fell outside every window.
    Unjudged,
    NoNote,
}

/// Per-pad lanes of visible, unjudged notes.
pub struct JudgeMachine {
    lanes: [VecDeque<RhythmNote>; PAD_COUNT],
    pub windows: JudgeWindows,
    /// Time after `t_hit` at which an untouched note becomes a Miss.
    pub expire: Seconds,
}

impl Default for JudgeMachine {
    fn default() -> Self {
        Self::new(JudgeWindows::default(), 0.250)
    }
}

impl JudgeMachine {
    pub fn new(windows: JudgeWindows, expire: Seconds) -> Self {
        Self {
            lanes: Default::default(),
            windows,
            expire,
        }
    }

    /// Makes a note visible on its pad and assigns its palette layer.
    pub fn admit(&mut self, mut note: RhythmNote) -> RhythmNote {
        let lane = &mut self.lanes[note.pad.index()];
        note.layer = lane.len() % LAYERS;
        lane.push_back(note);
        note
    }

    /// Judges a press against the oldest active note on `pad`.
    pub fn process_press(&mut self, pad: PadId, song_t: Seconds) -> PressOutcome {
        let lane = &mut self.lanes[pad.index()];
        let Some(note) = lane.front().copied() else {
            return PressOutcome::NoNote;
        };

        let delta = song_t - note.t_hit;
        match self.windows.judge(delta) {
            Some(judgment) => {
                lane.pop_front();
                PressOutcome::Judged(JudgmentResult {
                    note,
                    judgment,
                    delta,
                })
            }
            None => PressOutcome::Unjudged,
        }
    }

    /// Removes every note whose expiry has passed and reports them as misses.
    pub fn check_misses(&mut self, song_t: Seconds) -> Vec<JudgmentResult> {
        let expire = self.expire;
        let mut results = Vec::new();
        for lane in self.lanes.iter_mut() {
            lane.retain(|note| {
                let delta = song_t - note.t_hit;
                if delta <= expire {
                    return true;
                }
                results.push(JudgmentResult {
                    note: *note,
                    judgment: Judgment::Miss,
                    delta,
                });
                false
            });
        }
        results
    }

    pub fn lane(&self, pad: PadId) -> impl DoubleEndedIterator<Item = &RhythmNote> {
        self.lanes[pad.index()].iter()
    }

    pub fn remaining(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    /// Empties every lane, returning what was still active.
    pub fn drain_remaining(&mut self) -> Vec<RhythmNote> {
        self.lanes.iter_mut().flat_map(|lane| lane.drain(..)).collect()
    }
}
