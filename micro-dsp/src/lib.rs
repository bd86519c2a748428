//! Block-oriented spectral analysis for audio visualizers.
//!
//! An [`AudioBlock`] of mono samples goes through a Hann window and an FFT
//! sized to the block, producing a [`Spectrum`] of the non-negative
//! frequency half.

mod block;
mod energy;
mod spectrum;

use std::f32::consts::PI;

pub use block::{AudioBlock, BlockAssembler};
pub use energy::EnergyGate;
pub use spectrum::{Spectrum, WindowedSpectrum, DC_BIN};

/// Normalize a single sample from i16 to f32.
pub fn normalize_sample(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

/// Normalize a slice of i16 samples to a slice of f32 samples.
pub fn normalize_samples(samples: &[i16], normalized_samples: &mut [f32]) {
    for (out, &sample) in normalized_samples.iter_mut().zip(samples) {
        *out = normalize_sample(sample);
    }
}

/// Symmetric Hann window of `len` coefficients.
///
/// Both ends are zero and the peak sits at the center. A single-point window
/// is `[1.0]`.
pub fn hann_window(len: usize) -> Vec<f32> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f32;
            (0..len)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / denom).cos())
                .collect()
        }
    }
}

/// Apply a Hann window to a slice of f32 samples in place.
pub fn apply_hann_window(samples: &mut [f32]) {
    let window = hann_window(samples.len());
    for (sample, w) in samples.iter_mut().zip(window) {
        *sample *= w;
    }
}
