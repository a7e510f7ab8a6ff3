pub mod assets;
#[cfg(feature = "playback")]
pub mod backend;
pub mod clock_player;

pub use assets::AudioClip;
#[cfg(feature = "playback")]
pub use backend::StreamPlayer;
pub use clock_player::ClockPlayer;

use crate::{Result, Seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Ended,
    Stopped,
    Error,
}

impl PlayerState {
    /// Playback is over and will not resume.
    pub fn is_finished(self) -> bool {
        matches!(self, PlayerState::Ended | PlayerState::Stopped | PlayerState::Error)
    }
}

/// External audio player that owns the song clock.
pub trait AudioPlayer {
    fn play(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// Current playback position, `None` while the player cannot report one.
    fn position(&self) -> Option<Seconds>;

    fn duration(&self) -> Option<Seconds>;

    fn state(&self) -> PlayerState;
}
