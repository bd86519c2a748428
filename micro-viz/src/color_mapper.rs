use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

use crate::types::RgbFrame;

/// 256-step color wheel: red at 0, green at 85, blue at 170, back towards
/// red at 255. Each transition is linear over 85 steps.
pub fn wheel(pos: u8) -> Rgb888 {
    let pos = 255 - pos;
    if pos < 85 {
        Rgb888::new(255 - pos * 3, 0, pos * 3)
    } else if pos < 170 {
        let pos = pos - 85;
        Rgb888::new(0, pos * 3, 255 - pos * 3)
    } else {
        let pos = pos - 170;
        Rgb888::new(pos * 3, 255 - pos * 3, 0)
    }
}

/// Gives each channel a fixed hue and scales it by the channel level.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    base_colors: Vec<Rgb888>,
    brightness_cap: u8,
}

impl ColorMapper {
    pub fn new(channels: usize, brightness_cap: u8) -> Self {
        let base_colors = (0..channels)
            .map(|i| wheel((i * 256 / channels) as u8))
            .collect();
        Self {
            base_colors,
            brightness_cap,
        }
    }

    pub fn channels(&self) -> usize {
        self.base_colors.len()
    }

    pub fn brightness_cap(&self) -> u8 {
        self.brightness_cap
    }

    pub fn base_color(&self, channel: usize) -> Rgb888 {
        self.base_colors[channel]
    }

    pub fn color(&self, channel: usize, level: f32) -> Rgb888 {
        let base = self.base_colors[channel];
        let level = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
        let scale = |component: u8| ((component as f32 * level) as u8).min(self.brightness_cap);
        Rgb888::new(scale(base.r()), scale(base.g()), scale(base.b()))
    }

    /// Colors a whole frame. Missing levels render black.
    pub fn frame(&self, levels: &[f32]) -> RgbFrame {
        (0..self.channels())
            .map(|channel| self.color(channel, levels.get(channel).copied().unwrap_or(0.0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_primaries() {
        assert_eq!(wheel(0), Rgb888::new(255, 0, 0));
        assert_eq!(wheel(85), Rgb888::new(0, 255, 0));
        assert_eq!(wheel(170), Rgb888::new(0, 0, 255));
        assert_eq!(wheel(255), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_wheel_transitions_are_linear() {
        assert_eq!(wheel(1), Rgb888::new(252, 3, 0));
        assert_eq!(wheel(86), Rgb888::new(0, 252, 3));
        assert_eq!(wheel(171), Rgb888::new(3, 0, 252));
    }

    #[test]
    fn test_base_colors_walk_the_wheel() {
        let mapper = ColorMapper::new(32, 255);
        assert_eq!(mapper.base_color(0), wheel(0));
        assert_eq!(mapper.base_color(1), wheel(8));
        assert_eq!(mapper.base_color(31), wheel(248));
    }

    #[test]
    fn test_full_level_is_capped_base_color() {
        let mapper = ColorMapper::new(32, 100);
        assert_eq!(mapper.color(0, 1.0), Rgb888::new(100, 0, 0));

        let uncapped = ColorMapper::new(32, 255);
        assert_eq!(uncapped.color(0, 1.0), wheel(0));
    }

    #[test]
    fn test_zero_level_is_black_on_every_channel() {
        let mapper = ColorMapper::new(12, 255);
        assert!(mapper.frame(&[0.0; 12]).iter().all(|c| *c == Rgb888::BLACK));
    }

    #[test]
    fn test_components_scale_with_level() {
        let mapper = ColorMapper::new(3, 255);
        assert_eq!(mapper.color(0, 0.5), Rgb888::new(127, 0, 0));
        assert_eq!(mapper.color(0, 2.0), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_frame_never_exceeds_cap() {
        let mapper = ColorMapper::new(16, 40);
        let frame = mapper.frame(&[1.0; 16]);
        assert_eq!(frame.len(), 16);
        for color in frame {
            assert!(color.r() <= 40 && color.g() <= 40 && color.b() <= 40);
        }
    }
}
