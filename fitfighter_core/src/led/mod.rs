pub mod color;
pub mod device;

use std::ops::Range;

use rig_schema::PAD_COUNT;
use tracing::trace;

use self::color::{Color, OFF};
pub use self::device::{LedDevice, MemoryStrip};
use crate::{PadId, Result, Seconds};

/// Splits `pixel_count` pixels into eight contiguous, near-equal segments.
pub fn pad_segments(pixel_count: usize) -> [Range<usize>; PAD_COUNT] {
    std::array::from_fn(|i| (i * pixel_count / PAD_COUNT)..((i + 1) * pixel_count / PAD_COUNT))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FlashOverlay {
    expires_at: Seconds,
    retained: Option<Color>,
}

/// Frame buffer over a [`LedDevice`] with per-pad flash overlays.
///
/// Every loop iteration is one frame: `tick` opens it, drawing calls mutate
/// the buffer, and `flush` latches it to the device at most once.
pub struct LedCompositor<D: LedDevice> {
    device: D,
    buffer: Vec<Color>,
    segments: [Range<usize>; PAD_COUNT],
    overlays: [Option<FlashOverlay>; PAD_COUNT],
    frame: u64,
    flushed_frame: Option<u64>,
    last_written: Option<Vec<Color>>,
}

impl<D: LedDevice> LedCompositor<D> {
    pub fn new(device: D) -> Self {
        let pixel_count = device.pixel_count();
        Self {
            device,
            buffer: vec![OFF; pixel_count],
            segments: pad_segments(pixel_count),
            overlays: [None; PAD_COUNT],
            frame: 0,
            flushed_frame: None,
            last_written: None,
        }
    }

    pub fn segment(&self, pad: PadId) -> Range<usize> {
        self.segments[pad.index()].clone()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.buffer
    }

    pub fn pad_pixels(&self, pad: PadId) -> &[Color] {
        &self.buffer[self.segment(pad)]
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn set_pad(&mut self, pad: PadId, color: Color) {
        let range = self.segment(pad);
        self.buffer[range].fill(color);
    }

    /// Lights the leading `ratio` share of the segment and clears the rest.
    pub fn set_pad_progress(&mut self, pad: PadId, color: Color, ratio: f64) {
        self.set_pad(pad, OFF);
        self.fill_pad_prefix(pad, color, ratio);
    }

    /// Lights the leading `ratio` share of the segment, leaving the rest as is.
    pub fn fill_pad_prefix(&mut self, pad: PadId, color: Color, ratio: f64) {
        let range = self.segment(pad);
        let lit = lit_pixels(range.len(), ratio);
        self.buffer[range.start..range.start + lit].fill(color);
    }

    pub fn fill_all(&mut self, color: Color) {
        self.buffer.fill(color);
    }

    pub fn clear_all(&mut self) {
        self.fill_all(OFF);
    }

    /// Overwrites the pad now and reverts it to `retained` (or off) once
    /// `duration` has passed. Replaces any pending flash on that pad.
    pub fn flash(
        &mut self,
        pad: PadId,
        color: Color,
        duration: Seconds,
        retained: Option<Color>,
        now: Seconds,
    ) {
        self.set_pad(pad, color);
        self.overlays[pad.index()] = Some(FlashOverlay {
            expires_at: now + duration,
            retained,
        });
    }

    pub fn is_flashing(&self, pad: PadId) -> bool {
        self.overlays[pad.index()].is_some()
    }

    /// Drops the pending revert; the pad keeps whatever it shows now.
    pub fn cancel_flash(&mut self, pad: PadId) {
        self.overlays[pad.index()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.overlays = [None; PAD_COUNT];
    }

    /// Opens a new frame and reverts every flash whose deadline has passed.
    pub fn tick(&mut self, now: Seconds) {
        self.frame += 1;
        for pad in PadId::all() {
            let Some(overlay) = self.overlays[pad.index()] else {
                continue;
            };
            if now >= overlay.expires_at {
                self.overlays[pad.index()] = None;
                self.set_pad(pad, overlay.retained.unwrap_or(OFF));
            }
        }
    }

    /// Latches the buffer to the device. Returns `Ok(false)` when this frame
    /// was already flushed or nothing changed since the last write.
    pub fn flush(&mut self) -> Result<bool> {
        if self.flushed_frame == Some(self.frame) {
            trace!(frame = self.frame, "second flush in frame ignored");
            return Ok(false);
        }
        self.flushed_frame = Some(self.frame);

        if self.last_written.as_deref() == Some(self.buffer.as_slice()) {
            return Ok(false);
        }

        for (i, color) in self.buffer.iter().enumerate() {
            self.device.set_pixel(i, *color);
        }
        self.device.show()?;
        self.last_written = Some(self.buffer.clone());
        Ok(true)
    }

    /// Cancels overlays, blanks the strip and writes it in a fresh frame.
    pub fn blank(&mut self) -> Result<bool> {
        self.cancel_all();
        self.clear_all();
        self.frame += 1;
        self.flush()
    }
}

fn lit_pixels(len: usize, ratio: f64) -> usize {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    ((len as f64) * ratio).floor() as usize
}
