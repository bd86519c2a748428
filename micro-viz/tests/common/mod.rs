#![allow(dead_code)]

use micro_dsp::AudioBlock;
use micro_viz::{LedStrip, Rgb888, StripError};
use rand::{rngs::StdRng, Rng, SeedableRng};
use wavegen::{sine, wf};

pub const SAMPLE_RATE: u32 = 44_100;
pub const BLOCK_LEN: usize = 2205;

pub fn sine_block(frequency: f32, amplitude: f32) -> AudioBlock {
    let waveform = wf!(f32, SAMPLE_RATE as f32, sine!(frequency, amplitude));
    AudioBlock::new(waveform.iter().take(BLOCK_LEN).collect(), SAMPLE_RATE)
}

pub fn silent_block() -> AudioBlock {
    AudioBlock::new(vec![0.0; BLOCK_LEN], SAMPLE_RATE)
}

pub fn noise_block(amplitude: f32, seed: u64) -> AudioBlock {
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = (0..BLOCK_LEN)
        .map(|_| rng.random_range(-amplitude..=amplitude))
        .collect();
    AudioBlock::new(samples, SAMPLE_RATE)
}

pub fn lit_channels(levels: &[f32]) -> Vec<usize> {
    (0..levels.len()).filter(|&i| levels[i] > 0.0).collect()
}

/// Strip fake that records every committed frame.
#[derive(Debug, Default)]
pub struct RecordingStrip {
    pub pixel_count: usize,
    pub staged: Vec<Rgb888>,
    pub frames: Vec<Vec<Rgb888>>,
    pub fail_writes: bool,
}

impl RecordingStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixel_count,
            staged: vec![Rgb888::new(0, 0, 0); pixel_count],
            ..Self::default()
        }
    }

    pub fn resize(&mut self, pixel_count: usize) {
        self.pixel_count = pixel_count;
        self.staged = vec![Rgb888::new(0, 0, 0); pixel_count];
    }

    pub fn last_frame(&self) -> &[Rgb888] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_frame_is_dark(&self) -> bool {
        !self.frames.is_empty()
            && self
                .last_frame()
                .iter()
                .all(|c| *c == Rgb888::new(0, 0, 0))
    }
}

impl LedStrip for RecordingStrip {
    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn set_color(&mut self, index: usize, color: Rgb888) -> Result<(), StripError> {
        if self.fail_writes {
            return Err(StripError::Write("bus timeout".to_string()));
        }
        let len = self.staged.len();
        *self
            .staged
            .get_mut(index)
            .ok_or(StripError::IndexOutOfRange { index, len })? = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), StripError> {
        self.frames.push(self.staged.clone());
        Ok(())
    }
}
