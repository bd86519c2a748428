use approx::assert_abs_diff_eq;
use micro_dsp::{apply_hann_window, normalize_samples, AudioBlock, EnergyGate, WindowedSpectrum};
pub mod common;
use common::*;

const TOLERANCE: f32 = 1e-3;

#[test]
fn test_normalize_samples_real_world() {
    let sine_i16 = sine_block_i16(440.0, 1024);
    let expected_output = sine_block(440.0, 1.0, 1024);
    let mut normalized_samples = [0.0; 1024];
    normalize_samples(&sine_i16, &mut normalized_samples);
    for (i, &normalized) in normalized_samples.iter().enumerate() {
        assert!(
            (normalized - expected_output[i]).abs() < TOLERANCE,
            "Expected {}, got {} at index {}",
            expected_output[i],
            normalized,
            i
        );
    }
}

#[test]
fn test_apply_hann_window_keeps_center_and_kills_edges() {
    let mut samples = sine_block(1000.0, 1.0, 1024);
    let original = samples.clone();
    apply_hann_window(&mut samples);

    assert_abs_diff_eq!(samples[0], 0.0, epsilon = TOLERANCE);
    assert_abs_diff_eq!(samples[1023], 0.0, epsilon = TOLERANCE);
    assert_abs_diff_eq!(samples[512], original[512], epsilon = 1e-2);
}

#[test]
fn test_sine_peaks_at_its_bin() {
    let mut analyzer = WindowedSpectrum::new();
    let block = AudioBlock::new(sine_block(1000.0, 1.0, BLOCK_LEN), SAMPLE_RATE);
    let spectrum = analyzer.analyze(&block);

    assert_eq!(spectrum.len(), BLOCK_LEN / 2);
    let peak = argmax(spectrum.magnitudes());
    assert_eq!(peak, 50);
    assert_abs_diff_eq!(spectrum.frequencies()[peak], 1000.0, epsilon = 1e-2);
    // Hann-windowed full-scale sine: peak magnitude is roughly L/4.
    assert!(spectrum.magnitudes()[peak] > BLOCK_LEN as f32 / 4.0 * 0.9);
}

#[test]
fn test_i16_block_matches_float_block() {
    let mut analyzer = WindowedSpectrum::new();
    let from_pcm = analyzer.analyze(&AudioBlock::from_i16(
        &sine_block_i16(2000.0, BLOCK_LEN),
        SAMPLE_RATE,
    ));
    assert_eq!(argmax(from_pcm.magnitudes()), 100);
}

#[test]
fn test_noise_spectrum_is_finite_and_non_negative() {
    let mut analyzer = WindowedSpectrum::new();
    let spectrum = analyzer.analyze(&AudioBlock::new(noise_block(0.5, 1024, 7), SAMPLE_RATE));
    assert_eq!(spectrum.len(), 512);
    assert!(spectrum
        .magnitudes()
        .iter()
        .all(|m| m.is_finite() && *m >= 0.0));
    assert!(spectrum.frequencies().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_windowed_energy_of_full_scale_sine() {
    let mut analyzer = WindowedSpectrum::new();
    let block = AudioBlock::new(sine_block(1000.0, 1.0, BLOCK_LEN), SAMPLE_RATE);
    let spectrum = analyzer.analyze(&block);
    // mean(sin²) * mean(hann²) = 0.5 * 0.375
    assert_abs_diff_eq!(spectrum.energy(), 0.1875, epsilon = 5e-3);
}

#[test]
fn test_energy_gate_on_real_blocks() {
    let mut analyzer = WindowedSpectrum::new();
    let mut gate = EnergyGate::new(2, 1.0);
    let quiet = analyzer.analyze(&AudioBlock::new(sine_block(500.0, 0.1, 1024), SAMPLE_RATE));
    let loud = analyzer.analyze(&AudioBlock::new(sine_block(500.0, 0.8, 1024), SAMPLE_RATE));

    assert!(!gate.admit(quiet.energy()));
    assert!(gate.admit(loud.energy()));
    assert!(!gate.admit(loud.energy()));
}
