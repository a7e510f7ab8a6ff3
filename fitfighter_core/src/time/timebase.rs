use std::fmt;

use crate::audio::{AudioPlayer, PlayerState};
use crate::Seconds;

/// Fixed mapping from the local monotonic clock to the song clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    offset: Seconds,
}

impl Timebase {
    /// `offset = local - player_position`, sampled once.
    pub fn from_sample(local: Seconds, player_position: Seconds) -> Self {
        Self {
            offset: local - player_position,
        }
    }

    pub fn offset(&self) -> Seconds {
        self.offset
    }

    pub fn song_time(&self, local: Seconds) -> Seconds {
        local - self.offset
    }

    pub fn local_time(&self, song: Seconds) -> Seconds {
        song + self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockFailure {
    /// Playback finished or failed before a position could be sampled.
    PlayerFinished(PlayerState),
    /// No usable position was reported within the lock window.
    Timeout(Seconds),
}

impl fmt::Display for LockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockFailure::PlayerFinished(state) => write!(f, "player reported {state:?} before lock"),
            LockFailure::Timeout(secs) => write!(f, "no player position after {secs:.2}s"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockStatus {
    Pending,
    Locked(Timebase),
    Failed(LockFailure),
}

/// Polled lock attempt: waits `settle` after playback starts, then samples
/// the player position once.
#[derive(Debug, Clone, Copy)]
pub struct TimebaseLock {
    started_at: Seconds,
    settle: Seconds,
    timeout: Seconds,
}

impl TimebaseLock {
    pub fn new(started_at: Seconds, settle: Seconds, timeout: Seconds) -> Self {
        Self {
            started_at,
            settle,
            timeout,
        }
    }

    pub fn poll(&self, now: Seconds, player: &dyn AudioPlayer) -> LockStatus {
        let state = player.state();
        if state.is_finished() {
            return LockStatus::Failed(LockFailure::PlayerFinished(state));
        }

        let waited = now - self.started_at;
        if waited >= self.settle {
            if let Some(position) = player.position().filter(|p| *p >= 0.0) {
                return LockStatus::Locked(Timebase::from_sample(now, position));
            }
        }

        if waited >= self.timeout {
            return LockStatus::Failed(LockFailure::Timeout(self.timeout));
        }
        LockStatus::Pending
    }
}
