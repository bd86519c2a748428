use micro_dsp::Spectrum;

use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::config::{FrequencyScale, VisualizerConfig};
use crate::error::ConfigError;
use crate::level_curve::LevelCurve;
use crate::types::{strongest_indices, ChannelLevels};

/// Lowest accepted lower edge for logarithmic schedules.
pub const LOG_MIN_FREQUENCY: f32 = 20.0;

/// `N + 1` strictly increasing frequency edges describing `N` half-open
/// bands `[edge[i], edge[i + 1])`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSchedule {
    edges: Vec<f32>,
}

impl BandSchedule {
    pub fn new(
        scale: FrequencyScale,
        min_frequency: f32,
        max_frequency: f32,
        channels: usize,
    ) -> Result<Self, ConfigError> {
        match scale {
            FrequencyScale::Linear => Self::linear(max_frequency, channels),
            FrequencyScale::Logarithmic => {
                Self::logarithmic(min_frequency, max_frequency, channels)
            }
        }
    }

    /// Edges evenly spaced from 0 Hz to `max_frequency`.
    pub fn linear(max_frequency: f32, channels: usize) -> Result<Self, ConfigError> {
        check_common(max_frequency, channels)?;
        let step = f64::from(max_frequency) / channels as f64;
        let mut edges: Vec<f32> = (0..=channels).map(|i| (i as f64 * step) as f32).collect();
        edges[channels] = max_frequency;
        Self::from_edges(edges, 0.0, max_frequency)
    }

    /// Edges evenly spaced in log2 between `min_frequency` and
    /// `max_frequency`; every band spans the same pitch interval.
    pub fn logarithmic(
        min_frequency: f32,
        max_frequency: f32,
        channels: usize,
    ) -> Result<Self, ConfigError> {
        check_common(max_frequency, channels)?;
        if !(min_frequency >= LOG_MIN_FREQUENCY) {
            return Err(ConfigError::LogMinimumTooLow {
                min: min_frequency,
                floor: LOG_MIN_FREQUENCY,
            });
        }
        if min_frequency >= max_frequency {
            return Err(ConfigError::InvertedFrequencyRange {
                min: min_frequency,
                max: max_frequency,
            });
        }

        let low = f64::from(min_frequency).log2();
        let high = f64::from(max_frequency).log2();
        let step = (high - low) / channels as f64;
        let mut edges: Vec<f32> = (0..=channels)
            .map(|i| (low + i as f64 * step).exp2() as f32)
            .collect();
        edges[0] = min_frequency;
        edges[channels] = max_frequency;
        Self::from_edges(edges, min_frequency, max_frequency)
    }

    fn from_edges(edges: Vec<f32>, min: f32, max: f32) -> Result<Self, ConfigError> {
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::DegenerateSchedule {
                channels: edges.len() - 1,
                min,
                max,
            });
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    pub fn channels(&self) -> usize {
        self.edges.len() - 1
    }

    /// `(lower, upper)` edge of band `index`, upper exclusive.
    pub fn band(&self, index: usize) -> (f32, f32) {
        (self.edges[index], self.edges[index + 1])
    }
}

fn check_common(max_frequency: f32, channels: usize) -> Result<(), ConfigError> {
    if channels == 0 {
        return Err(ConfigError::InvalidChannelCount(channels));
    }
    if !(max_frequency > 0.0) || !max_frequency.is_finite() {
        return Err(ConfigError::NonPositiveFrequency {
            name: "max_frequency",
            value: max_frequency,
        });
    }
    Ok(())
}

/// Reduces a spectrum to one level per band of a [`BandSchedule`].
#[derive(Debug, Clone)]
pub struct SpectralBandAggregator {
    schedule: BandSchedule,
    summary: BinSummaryStrategy,
    curve: LevelCurve,
    relative_levels: bool,
    keep_strongest: Option<usize>,
}

impl SpectralBandAggregator {
    pub fn new(schedule: BandSchedule, summary: BinSummaryStrategy, curve: LevelCurve) -> Self {
        Self {
            schedule,
            summary,
            curve,
            relative_levels: false,
            keep_strongest: None,
        }
    }

    pub fn from_config(config: &VisualizerConfig, channels: usize) -> Result<Self, ConfigError> {
        Ok(
            Self::new(config.band_schedule(channels)?, config.band_summary, config.level_curve())
                .with_relative_levels(config.relative_levels)
                .with_keep_strongest(config.keep_strongest_bands),
        )
    }

    /// Rescales each frame so its strongest band sits at 1.0.
    pub fn with_relative_levels(mut self, relative_levels: bool) -> Self {
        self.relative_levels = relative_levels;
        self
    }

    /// Zeroes every band except the `k` strongest. The survivors are
    /// rescaled as with [`with_relative_levels`](Self::with_relative_levels).
    pub fn with_keep_strongest(mut self, keep_strongest: Option<usize>) -> Self {
        self.keep_strongest = keep_strongest;
        self
    }

    pub fn schedule(&self) -> &BandSchedule {
        &self.schedule
    }

    pub fn channels(&self) -> usize {
        self.schedule.channels()
    }

    pub fn map(&self, spectrum: &Spectrum) -> ChannelLevels {
        let mut levels = vec![0.0; self.channels()];
        let max = spectrum.max_magnitude();
        if !(max > 0.0) {
            return levels;
        }

        let frequencies = spectrum.frequencies();
        let magnitudes = spectrum.magnitudes();
        for (index, level) in levels.iter_mut().enumerate() {
            let (lower, upper) = self.schedule.band(index);
            let start = frequencies.partition_point(|&f| f < lower);
            let end = frequencies.partition_point(|&f| f < upper);
            // Summaries are homogeneous, so dividing afterwards equals
            // summarizing the normalized spectrum.
            let raw = self.summary.calculate(&magnitudes[start..end]) / max;
            *level = self.curve.shape(raw);
        }

        if self.relative_levels || self.keep_strongest.is_some() {
            let top = levels.iter().copied().fold(0.0, f32::max);
            if top > 0.0 {
                levels.iter_mut().for_each(|level| *level /= top);
            }
        }

        if let Some(k) = self.keep_strongest {
            if k < levels.len() {
                let kept = strongest_indices(&levels, k);
                for (index, level) in levels.iter_mut().enumerate() {
                    if !kept.contains(&index) {
                        *level = 0.0;
                    }
                }
            }
        }

        self.curve.gate(&mut levels);
        levels
    }
}
