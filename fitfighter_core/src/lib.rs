pub mod audio;
pub mod error;
pub mod gameplay;
pub mod input;
pub mod led;
pub mod session;
pub mod time;

pub use error::{Result, SessionError};
pub use rig_schema::{PadId, Seconds};
