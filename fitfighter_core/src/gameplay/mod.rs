pub mod combo;
pub mod friend_foe;
pub mod judge;
pub mod rhythm;

use crate::Seconds;

pub use combo::{ComboConfig, ComboEngine};
pub use friend_foe::{Difficulty, FriendFoeConfig, FriendFoeEngine, FriendFoePreset};
pub use rhythm::{RhythmConfig, RhythmEngine};

pub const DEFAULT_LIVES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeLimit {
    Seconds(Seconds),
    Endless,
}

impl TimeLimit {
    pub fn is_over(&self, elapsed: Seconds) -> bool {
        match self {
            TimeLimit::Seconds(limit) => elapsed >= *limit,
            TimeLimit::Endless => false,
        }
    }
}

/// Running streak with its high-water mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streak {
    current: u32,
    highest: u32,
}

impl Streak {
    pub fn hit(&mut self) {
        self.current += 1;
    }

    pub fn reset(&mut self) {
        self.highest = self.highest.max(self.current);
        self.current = 0;
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn highest(&self) -> u32 {
        self.highest.max(self.current)
    }
}

pub(crate) fn mean(values: &[Seconds]) -> Option<Seconds> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Hits per second over a session, guarding against a zero-length run.
pub(crate) fn rate(count: u32, elapsed: Seconds) -> f64 {
    count as f64 / elapsed.max(0.001)
}
