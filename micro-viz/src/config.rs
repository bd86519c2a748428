//! Visualizer settings, loaded once at startup.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. The named presets capture tunings that have worked well on a
//! 32-pixel strip; none of them is more correct than another.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bin_summary_strategy::BinSummaryStrategy;
use crate::error::ConfigError;
use crate::level_curve::LevelCurve;
use crate::spectral_band_aggregator::{BandSchedule, LOG_MIN_FREQUENCY};

/// How band edges are spaced between the minimum and maximum frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyScale {
    /// Evenly spaced from 0 Hz to the maximum frequency.
    Linear,
    /// Evenly spaced in log2 between the minimum and maximum frequency.
    #[default]
    Logarithmic,
}

/// How spectrum bins become channel levels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    /// One band per channel, reduced with the configured bin summary.
    #[default]
    Bands,
    /// The `k` strongest bins at or above `min_frequency`, each lighting
    /// the channel its frequency maps to.
    Peaks {
        k: usize,
        #[serde(default)]
        min_frequency: f32,
    },
}

/// Noise-floor gate applied to channel levels after shaping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "floor", rename_all = "snake_case")]
pub enum Threshold {
    #[default]
    None,
    /// Zero levels below a fixed floor.
    Absolute(f32),
    /// Zero levels below `floor` times the strongest level of the frame.
    Relative(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyGateConfig {
    /// Number of recent blocks averaged, including the current one.
    pub history: usize,
    /// A block passes when its energy exceeds `sensitivity` times the average.
    pub sensitivity: f32,
}

impl Default for EnergyGateConfig {
    fn default() -> Self {
        Self {
            history: 2,
            sensitivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub sample_rate: u32,
    pub block_duration_ms: f32,
    /// Strip length to drive. `None` takes whatever the strip reports.
    pub led_count: Option<usize>,
    pub frequency_scale: FrequencyScale,
    /// Lower edge for logarithmic bands. Linear bands always start at 0 Hz.
    pub min_frequency: f32,
    /// Frequency mapped to the last channel.
    pub max_frequency: f32,
    /// Perceptual curve applied to normalized levels (0.5 is a square root).
    pub exponent: f32,
    pub intensity_scale: f32,
    /// Per-frame multiplicative fall-off once a level stops rising.
    pub decay: f32,
    /// Smoothed levels that decay below this snap to zero.
    pub release_floor: f32,
    /// Per-component ceiling for emitted colors.
    pub brightness_cap: u8,
    pub selection: SelectionMode,
    pub band_summary: BinSummaryStrategy,
    /// Re-express band levels relative to the strongest band of the frame.
    pub relative_levels: bool,
    /// Only the strongest `k` bands keep a level, relative to the strongest.
    pub keep_strongest_bands: Option<usize>,
    pub threshold: Threshold,
    pub exclude_dc: bool,
    pub energy_gate: Option<EnergyGateConfig>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_duration_ms: 50.0,
            led_count: Some(32),
            frequency_scale: FrequencyScale::Logarithmic,
            min_frequency: 20.0,
            max_frequency: 4000.0,
            exponent: 0.5,
            intensity_scale: 1.0,
            decay: 0.8,
            release_floor: 0.0,
            brightness_cap: 100,
            selection: SelectionMode::Bands,
            band_summary: BinSummaryStrategy::Average,
            relative_levels: false,
            keep_strongest_bands: None,
            threshold: Threshold::None,
            exclude_dc: true,
            energy_gate: None,
        }
    }
}

/// Names accepted by [`VisualizerConfig::preset`].
pub const PRESETS: &[&str] = &[
    "spectrum",
    "threshold-fade",
    "relative-fade",
    "log-top-bands",
    "dominant",
    "dominant-highpass",
    "top3-trail",
    "top3-wide",
    "beat-dominant",
];

impl VisualizerConfig {
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let linear_2k = Self {
            frequency_scale: FrequencyScale::Linear,
            max_frequency: 2000.0,
            ..Self::default()
        };
        let dominant = Self {
            selection: SelectionMode::Peaks {
                k: 1,
                min_frequency: 0.0,
            },
            decay: 0.5,
            brightness_cap: 255,
            ..linear_2k.clone()
        };

        let config = match name {
            "spectrum" => Self {
                intensity_scale: 3.0,
                ..linear_2k
            },
            "threshold-fade" => Self {
                intensity_scale: 3.0,
                threshold: Threshold::Absolute(0.05),
                ..linear_2k
            },
            "relative-fade" => Self {
                brightness_cap: 30,
                relative_levels: true,
                threshold: Threshold::Relative(0.05),
                ..linear_2k
            },
            "log-top-bands" => Self {
                frequency_scale: FrequencyScale::Logarithmic,
                min_frequency: 20.0,
                max_frequency: 4000.0,
                exponent: 1.0,
                decay: 0.5,
                release_floor: 0.01,
                brightness_cap: 50,
                relative_levels: true,
                keep_strongest_bands: Some(5),
                ..Self::default()
            },
            "dominant" => dominant,
            "dominant-highpass" => Self {
                block_duration_ms: 25.0,
                selection: SelectionMode::Peaks {
                    k: 1,
                    min_frequency: 800.0,
                },
                ..dominant
            },
            "top3-trail" => Self {
                selection: SelectionMode::Peaks {
                    k: 3,
                    min_frequency: 0.0,
                },
                decay: 0.85,
                brightness_cap: 100,
                ..linear_2k
            },
            "top3-wide" => Self {
                max_frequency: 4000.0,
                selection: SelectionMode::Peaks {
                    k: 3,
                    min_frequency: 0.0,
                },
                decay: 0.9,
                brightness_cap: 255,
                ..linear_2k
            },
            "beat-dominant" => Self {
                max_frequency: 3000.0,
                selection: SelectionMode::Peaks {
                    k: 1,
                    min_frequency: 800.0,
                },
                energy_gate: Some(EnergyGateConfig::default()),
                ..dominant
            },
            other => {
                return Err(ConfigError::UnknownPreset {
                    name: other.to_string(),
                    known: PRESETS.join(", "),
                })
            }
        };
        Ok(config)
    }

    /// Checks every field. Called once before the engine is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if !(self.block_duration_ms > 0.0) || self.block_size() == 0 {
            return Err(ConfigError::InvalidBlockDuration(self.block_duration_ms));
        }
        if let Some(count) = self.led_count {
            if count == 0 {
                return Err(ConfigError::InvalidChannelCount(count));
            }
        }
        if !(self.max_frequency > 0.0) {
            return Err(ConfigError::NonPositiveFrequency {
                name: "max_frequency",
                value: self.max_frequency,
            });
        }
        if self.frequency_scale == FrequencyScale::Logarithmic {
            if !(self.min_frequency >= LOG_MIN_FREQUENCY) {
                return Err(ConfigError::LogMinimumTooLow {
                    min: self.min_frequency,
                    floor: LOG_MIN_FREQUENCY,
                });
            }
            if self.min_frequency >= self.max_frequency {
                return Err(ConfigError::InvertedFrequencyRange {
                    min: self.min_frequency,
                    max: self.max_frequency,
                });
            }
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::InvalidDecay(self.decay));
        }
        if !(self.release_floor >= 0.0 && self.release_floor < 1.0) {
            return Err(ConfigError::InvalidReleaseFloor(self.release_floor));
        }
        if !(self.exponent > 0.0) {
            return Err(ConfigError::InvalidExponent(self.exponent));
        }
        if !(self.intensity_scale >= 0.0) {
            return Err(ConfigError::InvalidIntensityScale(self.intensity_scale));
        }
        match self.threshold {
            Threshold::Absolute(floor) | Threshold::Relative(floor) if !(floor >= 0.0) => {
                return Err(ConfigError::InvalidThreshold(floor));
            }
            _ => {}
        }
        if let SelectionMode::Peaks { k, min_frequency } = self.selection {
            if k == 0 {
                return Err(ConfigError::EmptySelection { name: "peak count" });
            }
            if !(min_frequency >= 0.0) {
                return Err(ConfigError::NonPositiveFrequency {
                    name: "peak min_frequency",
                    value: min_frequency,
                });
            }
            if min_frequency >= self.max_frequency {
                return Err(ConfigError::InvertedFrequencyRange {
                    min: min_frequency,
                    max: self.max_frequency,
                });
            }
        }
        if self.keep_strongest_bands == Some(0) {
            return Err(ConfigError::EmptySelection {
                name: "keep_strongest_bands",
            });
        }
        if let Some(gate) = &self.energy_gate {
            if gate.history == 0 {
                return Err(ConfigError::EmptySelection {
                    name: "energy gate history",
                });
            }
            if !(gate.sensitivity >= 0.0) {
                return Err(ConfigError::InvalidGateSensitivity(gate.sensitivity));
            }
        }
        if let Some(count) = self.led_count {
            self.band_schedule(count)?;
        }
        Ok(())
    }

    /// Samples per block: `round(sample_rate * block_duration)`.
    pub fn block_size(&self) -> usize {
        (self.sample_rate as f64 * self.block_duration_ms as f64 / 1000.0).round() as usize
    }

    pub fn block_period(&self) -> Duration {
        let nanos = self.block_size() as u64 * 1_000_000_000 / u64::from(self.sample_rate.max(1));
        Duration::from_nanos(nanos)
    }

    pub fn level_curve(&self) -> LevelCurve {
        LevelCurve::new(self.exponent, self.intensity_scale, self.threshold)
    }

    pub fn band_schedule(&self, channels: usize) -> Result<BandSchedule, ConfigError> {
        BandSchedule::new(
            self.frequency_scale,
            self.min_frequency,
            self.max_frequency,
            channels,
        )
    }
}
