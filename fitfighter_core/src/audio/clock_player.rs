use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::assets::wav_duration;
use super::{AudioPlayer, PlayerState};
use crate::time::Clock;
use crate::{Result, Seconds, SessionError};

/// Silent player whose position follows a [`Clock`].
///
/// Used when the rig has no audio output, and in tests with a manual clock.
/// `startup_latency` models the time a real player takes before it reports a
/// position.
pub struct ClockPlayer {
    clock: Arc<dyn Clock>,
    duration: Seconds,
    startup_latency: Seconds,
    started_at: Option<Seconds>,
    stopped: bool,
}

impl ClockPlayer {
    pub fn new(clock: Arc<dyn Clock>, duration: Seconds) -> Self {
        Self {
            clock,
            duration,
            startup_latency: 0.0,
            started_at: None,
            stopped: false,
        }
    }

    pub fn from_wav(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.as_ref();
        let duration = wav_duration(path).map_err(|e| SessionError::Audio(format!("{e:#}")))?;
        debug!(path = %path.display(), duration, "loaded song length");
        Ok(Self::new(clock, duration))
    }

    pub fn with_startup_latency(mut self, latency: Seconds) -> Self {
        self.startup_latency = latency;
        self
    }

    fn elapsed(&self) -> Option<Seconds> {
        self.started_at
            .map(|start| self.clock.now() - start - self.startup_latency)
    }
}

impl AudioPlayer for ClockPlayer {
    fn play(&mut self) -> Result<()> {
        self.started_at = Some(self.clock.now());
        self.stopped = false;
        Ok(())
    }

    fn stop(&mut self) {
        if self.started_at.is_some() {
            self.stopped = true;
        }
    }

    fn position(&self) -> Option<Seconds> {
        self.elapsed()
            .filter(|t| *t >= 0.0)
            .map(|t| t.min(self.duration))
    }

    fn duration(&self) -> Option<Seconds> {
        Some(self.duration)
    }

    fn state(&self) -> PlayerState {
        if self.stopped {
            return PlayerState::Stopped;
        }
        match self.elapsed() {
            None => PlayerState::Idle,
            Some(t) if t >= self.duration => PlayerState::Ended,
            Some(_) => PlayerState::Playing,
        }
    }
}
