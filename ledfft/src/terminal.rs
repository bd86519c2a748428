use std::fmt::Write as _;
use std::io::Write;

use micro_viz::{LedStrip, Rgb888, RgbColor, StripError};

const PIXEL: &str = "\u{2588}\u{2588}";
const RESET: &str = "\x1b[0m";

/// Draws the strip as one row of truecolor blocks, redrawn in place on
/// every `show`.
pub struct TerminalStrip<W: Write> {
    pixels: Vec<Rgb888>,
    out: W,
    line: String,
}

impl<W: Write> TerminalStrip<W> {
    pub fn new(pixel_count: usize, out: W) -> Self {
        Self {
            pixels: vec![Rgb888::new(0, 0, 0); pixel_count],
            out,
            line: String::new(),
        }
    }

    /// Ends the row so the shell prompt starts on a fresh line.
    pub fn finish(&mut self) -> Result<(), StripError> {
        writeln!(self.out, "{RESET}")?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LedStrip for TerminalStrip<W> {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn set_color(&mut self, index: usize, color: Rgb888) -> Result<(), StripError> {
        let len = self.pixels.len();
        let pixel = self
            .pixels
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })?;
        *pixel = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), StripError> {
        self.line.clear();
        self.line.push('\r');
        for pixel in &self.pixels {
            // Writing into a String cannot fail.
            let _ = write!(
                self.line,
                "\x1b[38;2;{};{};{}m{PIXEL}",
                pixel.r(),
                pixel.g(),
                pixel.b()
            );
        }
        self.line.push_str(RESET);
        self.out.write_all(self.line.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_writes_one_truecolor_row() {
        let mut strip = TerminalStrip::new(2, Vec::new());
        strip
            .write_frame(&[Rgb888::new(255, 0, 0), Rgb888::new(0, 10, 20)])
            .unwrap();

        let out = String::from_utf8(strip.into_inner()).unwrap();
        assert!(out.starts_with('\r'));
        assert!(out.contains("\x1b[38;2;255;0;0m"));
        assert!(out.contains("\x1b[38;2;0;10;20m"));
        assert!(out.ends_with(RESET));
    }

    #[test]
    fn test_out_of_range_pixel() {
        let mut strip = TerminalStrip::new(1, Vec::new());
        assert!(matches!(
            strip.set_color(1, Rgb888::new(1, 2, 3)),
            Err(StripError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
