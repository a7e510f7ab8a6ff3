pub mod clock;
pub mod timebase;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use timebase::{LockFailure, LockStatus, Timebase, TimebaseLock};
