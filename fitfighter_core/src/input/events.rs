use crate::{PadId, Seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub pad: PadId,
    pub kind: EventKind,
    /// Local monotonic time of the hardware edge.
    pub timestamp: Seconds,
}

impl ButtonEvent {
    pub fn press(pad: PadId, timestamp: Seconds) -> Self {
        Self {
            pad,
            kind: EventKind::Press,
            timestamp,
        }
    }

    pub fn is_press(&self) -> bool {
        self.kind == EventKind::Press
    }
}
