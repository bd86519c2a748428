use crate::normalize_samples;

/// One fixed-length block of mono samples in `[-1, 1]`, tagged with its
/// sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBlock {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Builds a block from signed 16-bit PCM.
    pub fn from_i16(samples: &[i16], sample_rate: u32) -> Self {
        let mut normalized = vec![0.0; samples.len()];
        normalize_samples(samples, &mut normalized);
        Self::new(normalized, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Re-slices arbitrarily sized device buffers into fixed-size blocks.
///
/// Audio hosts hand out whatever buffer size they like; the visualizer wants
/// one block per fixed period. Leftover samples are carried into the next
/// push.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    block_len: usize,
    sample_rate: u32,
    pending: Vec<f32>,
}

impl BlockAssembler {
    pub fn new(block_len: usize, sample_rate: u32) -> Self {
        let block_len = block_len.max(1);
        Self {
            block_len,
            sample_rate,
            pending: Vec::with_capacity(block_len),
        }
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Samples waiting for the next full block.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Appends samples and calls `emit` once per completed block.
    pub fn push<F>(&mut self, samples: &[f32], mut emit: F)
    where
        F: FnMut(AudioBlock),
    {
        let mut rest = samples;
        while !rest.is_empty() {
            let wanted = self.block_len - self.pending.len();
            let take = wanted.min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.pending.len() == self.block_len {
                let samples =
                    std::mem::replace(&mut self.pending, Vec::with_capacity(self.block_len));
                emit(AudioBlock::new(samples, self.sample_rate));
            }
        }
    }

    /// Same as [`push`](Self::push) but keeps only the first of every
    /// `channels` interleaved samples.
    pub fn push_interleaved<F>(&mut self, samples: &[f32], channels: usize, emit: F)
    where
        F: FnMut(AudioBlock),
    {
        if channels <= 1 {
            self.push(samples, emit);
            return;
        }
        let mono: Vec<f32> = samples.iter().step_by(channels).copied().collect();
        self.push(&mono, emit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i16_normalizes() {
        let block = AudioBlock::from_i16(&[0, i16::MAX], 8_000);
        assert_eq!(block.samples(), &[0.0, 1.0]);
        assert_eq!(block.sample_rate(), 8_000);
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_assembler_emits_fixed_blocks_and_carries_remainder() {
        let mut assembler = BlockAssembler::new(4, 8_000);
        let mut blocks = Vec::new();

        assembler.push(&[1.0, 2.0, 3.0], |b| blocks.push(b));
        assert!(blocks.is_empty());
        assert_eq!(assembler.pending(), 3);

        assembler.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0], |b| blocks.push(b));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].samples(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(blocks[1].samples(), &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(assembler.pending(), 1);
    }

    #[test]
    fn test_assembler_takes_first_channel_of_interleaved_input() {
        let mut assembler = BlockAssembler::new(2, 8_000);
        let mut blocks = Vec::new();
        assembler.push_interleaved(&[0.1, -1.0, 0.2, -1.0], 2, |b| blocks.push(b));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].samples(), &[0.1, 0.2]);
    }
}
