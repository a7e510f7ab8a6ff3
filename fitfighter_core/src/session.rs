//! Engine-support library shared by the three game modes: rig ownership,
//! the poll/tick/flush loop and idempotent shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rig_schema::{EndReason, SessionResult};
use tracing::{debug, info, warn};

use crate::input::events::ButtonEvent;
use crate::input::{ButtonSource, InputBus};
use crate::led::{LedCompositor, LedDevice};
use crate::time::Clock;
use crate::{Result, Seconds};

/// Interrupt flag set from a signal handler and checked once per iteration.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// The hardware a session owns for its lifetime.
pub struct Rig<D: LedDevice> {
    pub bus: InputBus,
    pub leds: LedCompositor<D>,
    buttons: Option<Box<dyn ButtonSource>>,
    shut_down: bool,
}

impl<D: LedDevice> Rig<D> {
    pub fn new(device: D) -> Self {
        Self {
            bus: InputBus::new(),
            leds: LedCompositor::new(device),
            buttons: None,
            shut_down: false,
        }
    }

    /// Wires a button source into the bus.
    pub fn attach_buttons(
        &mut self,
        mut source: Box<dyn ButtonSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<()> {
        source.attach(self.bus.sender(), clock)?;
        self.buttons = Some(source);
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Locks input, releases the buttons, blanks the strip and frees the
    /// device. Only the first call has any effect.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.bus.lock();
        if let Some(mut buttons) = self.buttons.take() {
            buttons.release();
        }
        if let Err(e) = self.leds.blank() {
            warn!("failed to blank strip on shutdown: {e}");
        }
        self.leds.device_mut().release();
        debug!("rig shut down");
    }
}

impl<D: LedDevice> Drop for Rig<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    End(EndReason),
}

/// A game mode state machine driven by [`run_session`].
pub trait Engine {
    /// Sets up the first frame and the input window.
    fn start<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) -> Result<()>;

    /// One loop iteration. `event` is at most one accepted press.
    fn update<D: LedDevice>(
        &mut self,
        now: Seconds,
        event: Option<ButtonEvent>,
        rig: &mut Rig<D>,
    ) -> Result<Flow>;

    /// Builds the result. Runs after the rig is shut down.
    fn finish(self, now: Seconds, reason: EndReason) -> SessionResult;

    /// Called instead of `finish` when the session fails.
    fn abort(&mut self) {}
}

/// Runs `engine` until it ends, the signal fires, or an error occurs. The
/// rig is shut down on every path before this returns.
pub fn run_session<E: Engine, D: LedDevice>(
    mut engine: E,
    rig: &mut Rig<D>,
    clock: &dyn Clock,
    signal: &ShutdownSignal,
    poll_timeout: Duration,
) -> Result<SessionResult> {
    let outcome = drive(&mut engine, rig, clock, signal, poll_timeout);
    rig.shutdown();

    match outcome {
        Ok((now, reason)) => {
            info!(?reason, "session ended");
            Ok(engine.finish(now, reason))
        }
        Err(e) => {
            engine.abort();
            Err(e)
        }
    }
}

fn drive<E: Engine, D: LedDevice>(
    engine: &mut E,
    rig: &mut Rig<D>,
    clock: &dyn Clock,
    signal: &ShutdownSignal,
    poll_timeout: Duration,
) -> Result<(Seconds, EndReason)> {
    let now = clock.now();
    rig.leds.tick(now);
    engine.start(now, rig)?;
    rig.leds.flush()?;

    loop {
        if signal.is_shutdown() {
            return Ok((clock.now(), EndReason::Interrupted));
        }

        let event = rig
            .bus
            .poll(poll_timeout)
            .filter(|ev| ev.is_press() && rig.bus.accepts(ev.timestamp));

        let now = clock.now();
        rig.leds.tick(now);
        let flow = engine.update(now, event, rig)?;
        rig.leds.flush()?;

        if let Flow::End(reason) = flow {
            return Ok((now, reason));
        }
    }
}
