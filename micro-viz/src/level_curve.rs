use crate::config::Threshold;

/// Perceptual shaping shared by band aggregation and peak selection:
/// `clamp(level^exponent * intensity_scale, 0, 1)`, followed by an optional
/// noise-floor gate over the whole frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCurve {
    exponent: f32,
    intensity_scale: f32,
    threshold: Threshold,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(0.5, 1.0, Threshold::None)
    }
}

impl LevelCurve {
    pub fn new(exponent: f32, intensity_scale: f32, threshold: Threshold) -> Self {
        Self {
            exponent,
            intensity_scale,
            threshold,
        }
    }

    pub fn shape(&self, level: f32) -> f32 {
        if level.is_nan() {
            return 0.0;
        }
        (level.max(0.0).powf(self.exponent) * self.intensity_scale).clamp(0.0, 1.0)
    }

    /// Zeroes levels under the configured floor.
    pub fn gate(&self, levels: &mut [f32]) {
        let floor = match self.threshold {
            Threshold::None => return,
            Threshold::Absolute(floor) => floor,
            Threshold::Relative(floor) => floor * levels.iter().copied().fold(0.0, f32::max),
        };
        for level in levels.iter_mut().filter(|l| **l < floor) {
            *level = 0.0;
        }
    }
}
