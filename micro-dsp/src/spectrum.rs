use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::{debug, trace};

use crate::{hann_window, AudioBlock};

/// Index of the zero-frequency bin.
pub const DC_BIN: usize = 0;

/// Magnitude spectrum covering the non-negative frequency half of a transform.
///
/// `magnitudes` and `frequencies` always have the same length; frequencies
/// are ascending and in Hz. Bin [`DC_BIN`] holds the 0 Hz component when the
/// spectrum is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f32>,
    frequencies: Vec<f32>,
    energy: f32,
}

impl Spectrum {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a spectrum from `(frequency, magnitude)` pairs.
    ///
    /// Negative magnitudes are folded to their absolute value.
    pub fn from_bins<I>(bins: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let (frequencies, magnitudes) = bins.into_iter().map(|(f, m)| (f, m.abs())).unzip();
        Self {
            magnitudes,
            frequencies,
            energy: 0.0,
        }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    /// Mean square of the windowed block this spectrum was computed from.
    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Iterates `(frequency, magnitude)` pairs in ascending frequency order.
    pub fn bins(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }

    pub fn max_magnitude(&self) -> f32 {
        self.magnitudes.iter().copied().fold(0.0, f32::max)
    }

    /// Zeroes the DC bin. Mic and amplifier offsets otherwise dominate the
    /// lowest band.
    pub fn exclude_dc(&mut self) {
        if let Some(dc) = self.magnitudes.get_mut(DC_BIN) {
            *dc = 0.0;
        }
    }

    /// Divides every magnitude by the spectrum maximum.
    ///
    /// Returns `false` and leaves the spectrum untouched when the maximum is
    /// zero (silence or an empty spectrum).
    pub fn normalize(&mut self) -> bool {
        let max = self.max_magnitude();
        if max == 0.0 {
            return false;
        }
        for magnitude in &mut self.magnitudes {
            *magnitude /= max;
        }
        true
    }
}

/// Hann-windowed FFT analysis sized to each incoming block.
///
/// FFT plans and the window are cached, so steady-state analysis of equally
/// sized blocks does not allocate new plans.
pub struct WindowedSpectrum {
    planner: FftPlanner<f32>,
    fft: Option<Arc<dyn Fft<f32>>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Default for WindowedSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowedSpectrum {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            fft: None,
            window: Vec::new(),
            buffer: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Computes the magnitude spectrum of one block.
    ///
    /// Bin `k` sits at `k * sample_rate / len` Hz and only the first `len / 2`
    /// bins are kept. An empty block (or a zero sample rate) yields an empty
    /// spectrum, which callers treat as a no-op frame.
    pub fn analyze(&mut self, block: &AudioBlock) -> Spectrum {
        let len = block.len();
        if len == 0 || block.sample_rate() == 0 {
            return Spectrum::empty();
        }

        let fft = self.plan(len);

        self.buffer.clear();
        self.buffer.extend(
            block
                .samples()
                .iter()
                .zip(&self.window)
                .map(|(&s, &w)| Complex::new(s * w, 0.0)),
        );
        let energy = self.buffer.iter().map(|c| c.re * c.re).sum::<f32>() / len as f32;

        self.scratch
            .resize(fft.get_inplace_scratch_len(), Complex::new(0.0, 0.0));
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let half = len / 2;
        let bin_width = block.sample_rate() as f32 / len as f32;
        let magnitudes = self.buffer[..half].iter().map(|c| c.norm()).collect();
        let frequencies = (0..half).map(|k| k as f32 * bin_width).collect();

        trace!(len, half, energy, "analyzed block");

        Spectrum {
            magnitudes,
            frequencies,
            energy,
        }
    }

    fn plan(&mut self, len: usize) -> Arc<dyn Fft<f32>> {
        match &self.fft {
            Some(fft) if fft.len() == len => Arc::clone(fft),
            _ => {
                debug!(len, "planning FFT for new block length");
                let fft = self.planner.plan_fft_forward(len);
                self.window = hann_window(len);
                self.fft = Some(Arc::clone(&fft));
                fft
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_empty_block_gives_empty_spectrum() {
        let mut analyzer = WindowedSpectrum::new();
        let spectrum = analyzer.analyze(&AudioBlock::new(Vec::new(), 44_100));
        assert!(spectrum.is_empty());
        assert_eq!(spectrum.frequencies().len(), 0);
    }

    #[test]
    fn test_bin_frequencies_follow_block_length() {
        let mut analyzer = WindowedSpectrum::new();
        let spectrum = analyzer.analyze(&AudioBlock::new(vec![0.0; 2205], 44_100));
        assert_eq!(spectrum.len(), 1102);
        assert_eq!(spectrum.frequencies()[0], 0.0);
        assert_abs_diff_eq!(spectrum.frequencies()[1], 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(spectrum.frequencies()[50], 1000.0, epsilon = 1e-3);
    }

    #[test]
    fn test_dc_offset_lands_in_dc_bin() {
        let mut analyzer = WindowedSpectrum::new();
        let mut spectrum = analyzer.analyze(&AudioBlock::new(vec![0.5; 512], 8_000));
        let dc = spectrum.magnitudes()[DC_BIN];
        assert!(dc > 100.0);
        assert_abs_diff_eq!(spectrum.max_magnitude(), dc, epsilon = 1e-3);

        spectrum.exclude_dc();
        assert_eq!(spectrum.magnitudes()[DC_BIN], 0.0);
        assert!(spectrum.max_magnitude() < dc * 0.75);
    }

    #[test]
    fn test_normalize_scales_peak_to_one() {
        let mut spectrum = Spectrum::from_bins([(0.0, 2.0), (10.0, 4.0), (20.0, 1.0)]);
        assert!(spectrum.normalize());
        assert_eq!(spectrum.magnitudes(), &[0.5, 1.0, 0.25]);
    }

    #[test]
    fn test_normalize_silence_is_noop() {
        let mut spectrum = Spectrum::from_bins([(0.0, 0.0), (10.0, 0.0)]);
        assert!(!spectrum.normalize());
        assert_eq!(spectrum.magnitudes(), &[0.0, 0.0]);
    }

    #[test]
    fn test_plan_is_replaced_when_length_changes() {
        let mut analyzer = WindowedSpectrum::new();
        assert_eq!(analyzer.analyze(&AudioBlock::new(vec![0.1; 256], 8_000)).len(), 128);
        assert_eq!(analyzer.analyze(&AudioBlock::new(vec![0.1; 300], 8_000)).len(), 150);
        assert_eq!(analyzer.window.len(), 300);
    }

    #[test]
    fn test_energy_of_silence_is_zero() {
        let mut analyzer = WindowedSpectrum::new();
        let spectrum = analyzer.analyze(&AudioBlock::new(vec![0.0; 64], 8_000));
        assert_eq!(spectrum.energy(), 0.0);
    }
}
