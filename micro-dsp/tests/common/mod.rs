#![allow(dead_code)]

use rand::{rngs::StdRng, Rng, SeedableRng};
use wavegen::{sine, wf};

pub const SAMPLE_RATE: u32 = 44_100;
pub const BLOCK_LEN: usize = 2205;

/// Full-scale sine block at `frequency` Hz.
pub fn sine_block(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
    let waveform = wf!(f32, SAMPLE_RATE as f32, sine!(frequency, amplitude));
    waveform.iter().take(len).collect()
}

pub fn sine_block_i16(frequency: f32, len: usize) -> Vec<i16> {
    sine_block(frequency, 1.0, len)
        .into_iter()
        .map(|s| (s * i16::MAX as f32) as i16)
        .collect()
}

/// Deterministic white noise in `[-amplitude, amplitude]`.
pub fn noise_block(amplitude: f32, len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.random_range(-amplitude..=amplitude))
        .collect()
}

pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}
