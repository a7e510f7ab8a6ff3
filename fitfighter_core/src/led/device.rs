use super::color::{Color, OFF};
use crate::Result;

/// Fixed-size addressable strip. `show` latches every pixel set since the
/// previous `show` in one write.
pub trait LedDevice {
    fn pixel_count(&self) -> usize;

    fn set_pixel(&mut self, index: usize, color: Color);

    fn show(&mut self) -> Result<()>;

    /// Frees the driver. Called once from rig shutdown.
    fn release(&mut self) {}
}

/// In-memory strip that records what was latched.
#[derive(Debug, Clone)]
pub struct MemoryStrip {
    pending: Vec<Color>,
    shown: Vec<Color>,
    show_count: usize,
    released: bool,
}

impl MemoryStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pending: vec![OFF; pixel_count],
            shown: vec![OFF; pixel_count],
            show_count: 0,
            released: false,
        }
    }

    /// Pixels as of the last `show`.
    pub fn shown(&self) -> &[Color] {
        &self.shown
    }

    pub fn show_count(&self) -> usize {
        self.show_count
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl LedDevice for MemoryStrip {
    fn pixel_count(&self) -> usize {
        self.pending.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        if let Some(px) = self.pending.get_mut(index) {
            *px = color;
        }
    }

    fn show(&mut self) -> Result<()> {
        self.shown.copy_from_slice(&self.pending);
        self.show_count += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
