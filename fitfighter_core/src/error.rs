use thiserror::Error;

use crate::time::timebase::LockFailure;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("LED device error: {0}")]
    Device(String),

    #[error("button source error: {0}")]
    Buttons(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("could not lock audio timebase: {0}")]
    TimebaseLock(LockFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
