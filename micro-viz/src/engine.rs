use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use micro_dsp::{AudioBlock, EnergyGate, Spectrum, WindowedSpectrum};
use tracing::{debug, info, trace};

use crate::color_mapper::ColorMapper;
use crate::config::VisualizerConfig;
use crate::error::{ConfigError, EngineError, StripError};
use crate::peak_selector::PeakSelector;
use crate::spectral_band_aggregator::SpectralBandAggregator;
use crate::strip::LedStrip;
use crate::temporal_smoother::TemporalSmoother;
use crate::types::ChannelLevels;

/// Channels used until a strip reports its length, when the config leaves
/// `led_count` open.
const PROVISIONAL_CHANNELS: usize = 32;

/// Frames between periodic level dumps.
const LOG_INTERVAL_FRAMES: u8 = 200;

/// How raw channel levels are derived from a spectrum.
#[derive(Debug, Clone)]
pub enum ChannelMapper {
    Bands(SpectralBandAggregator),
    Peaks(PeakSelector),
}

impl ChannelMapper {
    pub fn from_config(config: &VisualizerConfig, channels: usize) -> Result<Self, ConfigError> {
        match PeakSelector::from_config(config) {
            Some(selector) => {
                if channels == 0 {
                    return Err(ConfigError::InvalidChannelCount(channels));
                }
                Ok(Self::Peaks(selector))
            }
            None => Ok(Self::Bands(SpectralBandAggregator::from_config(
                config, channels,
            )?)),
        }
    }

    pub fn map(&self, spectrum: &Spectrum, channels: usize) -> ChannelLevels {
        match self {
            Self::Bands(aggregator) => aggregator.map(spectrum),
            Self::Peaks(selector) => selector.select(spectrum, channels),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was written to the strip.
    Rendered,
    /// The block was empty; the strip was left untouched.
    Skipped,
}

/// Runs one audio block through analysis, mapping, smoothing and coloring,
/// and writes the result to a strip.
pub struct VisualizerEngine {
    config: VisualizerConfig,
    analyzer: WindowedSpectrum,
    gate: Option<EnergyGate>,
    mapper: ChannelMapper,
    smoother: TemporalSmoother,
    colors: ColorMapper,
    channels: usize,
    step_counter: u64,
    log_counter: u8,
}

impl VisualizerEngine {
    pub fn new(config: VisualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let channels = config.led_count.unwrap_or(PROVISIONAL_CHANNELS);
        let mapper = ChannelMapper::from_config(&config, channels)?;
        let smoother =
            TemporalSmoother::new(channels, config.decay).with_release_floor(config.release_floor);
        let colors = ColorMapper::new(channels, config.brightness_cap);
        let gate = config
            .energy_gate
            .map(|gate| EnergyGate::new(gate.history, gate.sensitivity));

        debug!(
            channels,
            selection = ?config.selection,
            scale = ?config.frequency_scale,
            max_frequency = config.max_frequency,
            "visualizer engine ready"
        );

        Ok(Self {
            config,
            analyzer: WindowedSpectrum::new(),
            gate,
            mapper,
            smoother,
            colors,
            channels,
            step_counter: 0,
            log_counter: 0,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Smoothed levels as of the last frame.
    pub fn levels(&self) -> &[f32] {
        self.smoother.levels()
    }

    pub fn frames(&self) -> u64 {
        self.step_counter
    }

    /// Raw per-channel levels for a block, before gating and smoothing.
    /// Does not touch any per-frame state.
    pub fn channel_levels(&mut self, block: &AudioBlock) -> ChannelLevels {
        let spectrum = self.analyze(block);
        self.mapper.map(&spectrum, self.channels)
    }

    pub fn process_block<S>(
        &mut self,
        block: &AudioBlock,
        strip: &mut S,
    ) -> Result<FrameOutcome, EngineError>
    where
        S: LedStrip + ?Sized,
    {
        let pixels = strip.pixel_count();
        if pixels != self.channels {
            self.reconfigure(pixels)?;
        }

        let spectrum = self.analyze(block);
        if spectrum.is_empty() {
            trace!(len = block.len(), "empty block skipped");
            return Ok(FrameOutcome::Skipped);
        }

        let admitted = match self.gate.as_mut() {
            Some(gate) => gate.admit(spectrum.energy()),
            None => true,
        };
        let raw = if admitted {
            self.mapper.map(&spectrum, self.channels)
        } else {
            trace!(energy = spectrum.energy(), "block below energy gate");
            vec![0.0; self.channels]
        };

        let levels = self.smoother.update(&raw);
        let frame = self.colors.frame(levels);
        strip.write_frame(&frame)?;

        self.step_counter = self.step_counter.wrapping_add(1);
        self.log_counter = self.log_counter.wrapping_add(1);
        if self.log_counter >= LOG_INTERVAL_FRAMES {
            debug!(frame = self.step_counter, levels = ?self.smoother.levels(), "smoothed levels");
            self.log_counter = 0;
        }
        Ok(FrameOutcome::Rendered)
    }

    /// Clears all state and leaves the strip dark.
    pub fn shutdown<S>(&mut self, strip: &mut S) -> Result<(), StripError>
    where
        S: LedStrip + ?Sized,
    {
        self.smoother.reset();
        if let Some(gate) = self.gate.as_mut() {
            gate.reset();
        }
        let dark = vec![Rgb888::BLACK; strip.pixel_count()];
        strip.write_frame(&dark)?;
        info!(frames = self.step_counter, "LED strip cleared");
        Ok(())
    }

    fn analyze(&mut self, block: &AudioBlock) -> Spectrum {
        let mut spectrum = self.analyzer.analyze(block);
        if self.config.exclude_dc {
            spectrum.exclude_dc();
        }
        spectrum
    }

    /// Rebuilds everything that depends on the channel count. Smoothed
    /// levels start over from zero.
    fn reconfigure(&mut self, channels: usize) -> Result<(), ConfigError> {
        if channels == 0 {
            return Err(ConfigError::InvalidChannelCount(channels));
        }
        self.mapper = ChannelMapper::from_config(&self.config, channels)?;
        self.smoother.resize(channels);
        self.colors = ColorMapper::new(channels, self.config.brightness_cap);
        debug!(from = self.channels, to = channels, "strip length changed, channels rebuilt");
        self.channels = channels;
        Ok(())
    }
}
