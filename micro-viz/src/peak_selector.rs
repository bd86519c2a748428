use micro_dsp::Spectrum;

use crate::config::{SelectionMode, VisualizerConfig};
use crate::level_curve::LevelCurve;
use crate::types::{strongest_indices, ChannelLevels};

/// Lights the channels of the `k` strongest bins instead of aggregating
/// bands.
///
/// A bin at frequency `f` lands on channel `round(f / max_frequency * N)`,
/// clamped to the strip. Several peaks on one channel add up, saturating at
/// full level.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSelector {
    k: usize,
    min_frequency: f32,
    max_frequency: f32,
    curve: LevelCurve,
}

impl PeakSelector {
    pub fn new(k: usize, min_frequency: f32, max_frequency: f32, curve: LevelCurve) -> Self {
        Self {
            k,
            min_frequency,
            max_frequency,
            curve,
        }
    }

    /// Returns `None` when the config selects bands rather than peaks.
    pub fn from_config(config: &VisualizerConfig) -> Option<Self> {
        match config.selection {
            SelectionMode::Peaks { k, min_frequency } => Some(Self::new(
                k,
                min_frequency,
                config.max_frequency,
                config.level_curve(),
            )),
            SelectionMode::Bands => None,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Target channel for a frequency on a strip of `channels` LEDs.
    pub fn channel_for(&self, frequency: f32, channels: usize) -> usize {
        let position = (frequency / self.max_frequency * channels as f32).round();
        if !(position > 0.0) {
            return 0;
        }
        (position as usize).min(channels.saturating_sub(1))
    }

    pub fn select(&self, spectrum: &Spectrum, channels: usize) -> ChannelLevels {
        let mut levels = vec![0.0; channels];
        let max = spectrum.max_magnitude();
        if channels == 0 || !(max > 0.0) {
            return levels;
        }

        let frequencies = spectrum.frequencies();
        let magnitudes = spectrum.magnitudes();
        // Bins below the high-pass are skipped by index; frequencies ascend.
        let first = frequencies.partition_point(|&f| f < self.min_frequency);
        let candidates = &magnitudes[first..];

        for offset in strongest_indices(candidates, self.k) {
            let bin = first + offset;
            let channel = self.channel_for(frequencies[bin], channels);
            let contribution = self.curve.shape(magnitudes[bin] / max);
            levels[channel] = (levels[channel] + contribution).min(1.0);
        }

        self.curve.gate(&mut levels);
        levels
    }
}
