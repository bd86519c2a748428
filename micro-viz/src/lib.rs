//! Spectral-to-LED mapping engine.
//!
//! Turns [`micro_dsp::Spectrum`]s into smoothly animated RGB frames for an
//! addressable LED strip:
//!
//! ```text
//! AudioBlock -> WindowedSpectrum -> (band aggregation | peak selection)
//!            -> TemporalSmoother -> ColorMapper -> LedStrip
//! ```
//!
//! [`VisualizerEngine`] owns all per-frame state. It is driven from a single
//! thread, either directly or through [`run_blocks`].

pub mod bin_summary_strategy;
pub mod block_loop;
pub mod color_mapper;
pub mod config;
pub mod engine;
pub mod error;
pub mod level_curve;
pub mod peak_selector;
pub mod spectral_band_aggregator;
pub mod strip;
pub mod temporal_smoother;
pub mod types;

pub use bin_summary_strategy::BinSummaryStrategy;
pub use block_loop::{block_channel, run_blocks, AudioEvent, BlockReceiver, BlockSender, RunStats};
pub use color_mapper::{wheel, ColorMapper};
pub use config::{EnergyGateConfig, FrequencyScale, SelectionMode, Threshold, VisualizerConfig};
pub use engine::{ChannelMapper, FrameOutcome, VisualizerEngine};
pub use error::{ConfigError, EngineError, StripError};
pub use level_curve::LevelCurve;
pub use peak_selector::PeakSelector;
pub use spectral_band_aggregator::{BandSchedule, SpectralBandAggregator};
pub use strip::{LedStrip, MemoryStrip};
pub use temporal_smoother::TemporalSmoother;
pub use types::{ChannelLevels, RgbFrame};

pub use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
