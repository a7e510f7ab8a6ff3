//! Terminal stand-ins for the rig hardware: the strip is logged as one
//! character per pad and pads are struck by typing their numbers.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use fitfighter_core::input::{ButtonSource, PadSender, PadTrigger};
use fitfighter_core::led::color::{self, Color};
use fitfighter_core::led::{pad_segments, LedDevice};
use fitfighter_core::time::Clock;
use fitfighter_core::{PadId, Result};
use parking_lot::Mutex;
use rig_schema::PAD_COUNT;
use tracing::{debug, info, warn};

pub struct ConsoleStrip {
    pixels: Vec<Color>,
}

impl ConsoleStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixels: vec![color::OFF; pixel_count],
        }
    }

    /// One symbol per pad, taken from the first lit pixel of its segment.
    pub fn render_line(&self) -> String {
        pad_segments(self.pixels.len())
            .iter()
            .map(|range| {
                self.pixels[range.clone()]
                    .iter()
                    .find(|c| !c.is_off())
                    .map_or('.', |c| symbol(*c))
            })
            .collect()
    }
}

fn symbol(c: Color) -> char {
    match c {
        color::RED => 'R',
        color::GREEN => 'G',
        color::BLUE => 'B',
        color::TARGET_YELLOW | color::HIT_YELLOW => 'Y',
        color::PURPLE => 'P',
        color::PINK => 'K',
        color::CYAN => 'C',
        color::ORANGE => 'O',
        color::SKY => 'S',
        color::GREAT_GREEN => 'g',
        color::GOOD_VIOLET => 'v',
        _ => '*',
    }
}

impl LedDevice for ConsoleStrip {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        if let Some(px) = self.pixels.get_mut(index) {
            *px = color;
        }
    }

    fn show(&mut self) -> Result<()> {
        info!(target: "fitfighter_cli::leds", "[{}]", self.render_line());
        Ok(())
    }
}

/// Reads pad numbers from stdin; each digit 1-8 is a press followed by a
/// release.
pub struct StdinButtons {
    triggers: Arc<Mutex<Option<Vec<PadTrigger>>>>,
}

impl StdinButtons {
    pub fn new() -> Self {
        Self {
            triggers: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for StdinButtons {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonSource for StdinButtons {
    fn attach(&mut self, sender: PadSender, clock: Arc<dyn Clock>) -> Result<()> {
        let triggers: Vec<PadTrigger> = PadId::all().map(|pad| sender.trigger(pad)).collect();
        *self.triggers.lock() = Some(triggers);

        let shared = Arc::clone(&self.triggers);
        thread::Builder::new()
            .name("stdin-buttons".into())
            .spawn(move || read_presses(io::stdin().lock(), &shared, clock.as_ref()))?;
        Ok(())
    }

    fn release(&mut self) {
        if self.triggers.lock().take().is_some() {
            debug!("stdin buttons released");
        }
    }
}

fn read_presses(input: impl BufRead, triggers: &Mutex<Option<Vec<PadTrigger>>>, clock: &dyn Clock) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("stdin closed: {e}");
                return;
            }
        };
        let guard = triggers.lock();
        let Some(triggers) = guard.as_ref() else {
            return;
        };
        for ch in line.chars().filter(|c| !c.is_whitespace()) {
            let index = ch
                .to_digit(10)
                .and_then(|d| (d as usize).checked_sub(1))
                .filter(|i| *i < PAD_COUNT);
            match index.and_then(|i| triggers.get(i)) {
                Some(trigger) => {
                    let now = clock.now();
                    trigger.press(now);
                    trigger.release(now);
                }
                None => warn!("ignoring key {ch:?}, expected pads 1-8"),
            }
        }
    }
}
