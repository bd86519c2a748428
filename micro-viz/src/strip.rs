use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

use crate::error::StripError;

/// An addressable LED strip.
///
/// Colors are staged with [`set_color`](LedStrip::set_color) and become
/// visible on [`show`](LedStrip::show). The strip's pixel count decides how
/// many channels the engine drives.
pub trait LedStrip {
    fn pixel_count(&self) -> usize;

    fn set_color(&mut self, index: usize, color: Rgb888) -> Result<(), StripError>;

    fn show(&mut self) -> Result<(), StripError>;

    /// Stages a whole frame and commits it. Pixels beyond the strip are
    /// ignored.
    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), StripError> {
        let count = self.pixel_count();
        for (index, color) in frame.iter().take(count).enumerate() {
            self.set_color(index, *color)?;
        }
        self.show()
    }
}

/// In-memory strip. Keeps the last committed frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStrip {
    staged: Vec<Rgb888>,
    shown: Vec<Rgb888>,
    shows: usize,
}

impl MemoryStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            staged: vec![Rgb888::BLACK; pixel_count],
            shown: vec![Rgb888::BLACK; pixel_count],
            shows: 0,
        }
    }

    /// Colors as of the last `show`.
    pub fn pixels(&self) -> &[Rgb888] {
        &self.shown
    }

    pub fn shows(&self) -> usize {
        self.shows
    }

    pub fn is_dark(&self) -> bool {
        self.shown.iter().all(|c| *c == Rgb888::BLACK)
    }
}

impl LedStrip for MemoryStrip {
    fn pixel_count(&self) -> usize {
        self.staged.len()
    }

    fn set_color(&mut self, index: usize, color: Rgb888) -> Result<(), StripError> {
        let len = self.staged.len();
        let pixel = self
            .staged
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })?;
        *pixel = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), StripError> {
        self.shown.clone_from(&self.staged);
        self.shows += 1;
        Ok(())
    }
}
