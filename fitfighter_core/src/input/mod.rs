pub mod events;

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{trace, warn};

use self::events::{ButtonEvent, EventKind};
use crate::time::Clock;
use crate::{PadId, Result, Seconds};

/// FIFO of debounced pad edges with a lock/unlock acceptance window.
///
/// Producers push from their own threads through [`PadSender`]; the engine
/// loop is the single consumer.
pub struct InputBus {
    sender: Sender<ButtonEvent>,
    receiver: Receiver<ButtonEvent>,
    locked: bool,
    unlock_time: Seconds,
}

impl InputBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            locked: false,
            unlock_time: f64::NEG_INFINITY,
        }
    }

    /// Pushes a raw edge. Unknown pad ids are dropped.
    pub fn push(&self, pad: u8, kind: EventKind, timestamp: Seconds) -> bool {
        self.sender().push(pad, kind, timestamp)
    }

    /// Waits at most `timeout` for the next event.
    pub fn poll(&self, timeout: Duration) -> Option<ButtonEvent> {
        if timeout.is_zero() {
            return self.receiver.try_recv().ok();
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Discards everything queued and rejects input until [`unlock`](Self::unlock).
    pub fn lock(&mut self) {
        self.locked = true;
        let dropped = self.drain();
        if dropped > 0 {
            trace!(dropped, "input locked, queue drained");
        }
    }

    /// Opens the acceptance window; edges stamped at or before `now` stay rejected.
    pub fn unlock(&mut self, now: Seconds) {
        self.locked = false;
        self.unlock_time = now;
    }

    pub fn accepts(&self, timestamp: Seconds) -> bool {
        !self.locked && timestamp > self.unlock_time
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn unlock_time(&self) -> Seconds {
        self.unlock_time
    }

    pub fn drain(&self) -> usize {
        self.receiver.try_iter().count()
    }

    pub fn sender(&self) -> PadSender {
        PadSender {
            sender: self.sender.clone(),
        }
    }
}

impl Default for InputBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle, cheap to clone into per-pad callback threads.
#[derive(Clone)]
pub struct PadSender {
    sender: Sender<ButtonEvent>,
}

impl PadSender {
    pub fn push(&self, pad: u8, kind: EventKind, timestamp: Seconds) -> bool {
        let Some(pad) = PadId::new(pad) else {
            warn!(pad, "ignoring edge from unknown pad");
            return false;
        };
        self.sender
            .send(ButtonEvent {
                pad,
                kind,
                timestamp,
            })
            .is_ok()
    }

    /// Handle bound to a single pad id at registration time.
    pub fn trigger(&self, pad: PadId) -> PadTrigger {
        PadTrigger {
            pad,
            sender: self.sender.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PadTrigger {
    pad: PadId,
    sender: Sender<ButtonEvent>,
}

impl PadTrigger {
    pub fn pad(&self) -> PadId {
        self.pad
    }

    pub fn press(&self, timestamp: Seconds) {
        let _ = self.sender.send(ButtonEvent::press(self.pad, timestamp));
    }

    pub fn release(&self, timestamp: Seconds) {
        let _ = self.sender.send(ButtonEvent {
            pad: self.pad,
            kind: EventKind::Release,
            timestamp,
        });
    }
}

/// Edge-triggered, hardware-debounced pad buttons.
pub trait ButtonSource: Send {
    /// Starts delivering edges. Timestamps come from `clock`.
    fn attach(&mut self, sender: PadSender, clock: Arc<dyn Clock>) -> Result<()>;

    /// Stops delivery and frees the lines. Safe to call more than once.
    fn release(&mut self);
}
