use thiserror::Error;

/// Invalid visualizer settings. Detected before any audio is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("channel count must be at least 1, got {0}")]
    InvalidChannelCount(usize),

    #[error("{name} must be a positive frequency, got {value} Hz")]
    NonPositiveFrequency { name: &'static str, value: f32 },

    #[error("minimum frequency ({min} Hz) must be below maximum frequency ({max} Hz)")]
    InvertedFrequencyRange { min: f32, max: f32 },

    #[error("logarithmic bands need a minimum frequency of at least {floor} Hz, got {min} Hz")]
    LogMinimumTooLow { min: f32, floor: f32 },

    #[error("{channels} bands do not fit between {min} Hz and {max} Hz")]
    DegenerateSchedule { channels: usize, min: f32, max: f32 },

    #[error("decay factor must lie in (0, 1), got {0}")]
    InvalidDecay(f32),

    #[error("release floor must lie in [0, 1), got {0}")]
    InvalidReleaseFloor(f32),

    #[error("perceptual exponent must be positive, got {0}")]
    InvalidExponent(f32),

    #[error("intensity scale must be non-negative, got {0}")]
    InvalidIntensityScale(f32),

    #[error("threshold floor must be non-negative, got {0}")]
    InvalidThreshold(f32),

    #[error("{name} must select at least one entry")]
    EmptySelection { name: &'static str },

    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("block duration must be positive, got {0} ms")]
    InvalidBlockDuration(f32),

    #[error("energy gate sensitivity must be non-negative, got {0}")]
    InvalidGateSensitivity(f32),

    #[error("unknown preset `{name}`, expected one of: {known}")]
    UnknownPreset { name: String, known: String },
}

/// Failure reported by the LED collaborator.
#[derive(Debug, Error)]
pub enum StripError {
    #[error("pixel {index} is out of range for a strip of {len} pixels")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("strip write failed: {0}")]
    Write(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("LED strip error: {0}")]
    Strip(#[from] StripError),

    #[error("cannot configure for the attached strip: {0}")]
    Config(#[from] ConfigError),
}
