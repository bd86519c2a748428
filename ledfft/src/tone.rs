use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use micro_dsp::AudioBlock;
use micro_viz::{BlockSender, VisualizerConfig};
use tracing::info;
use wavegen::{sine, wf};

const AMPLITUDE: f32 = 0.8;

/// Stands in for a microphone: emits one sine block per block period until
/// `running` clears.
pub fn spawn(
    frequency: f32,
    config: &VisualizerConfig,
    sender: BlockSender,
    running: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let sample_rate = config.sample_rate;
    let block_len = config.block_size();
    let period = config.block_period();
    info!(frequency, block_len, "generating test tone");

    thread::Builder::new()
        .name("tone".to_string())
        .spawn(move || {
            let waveform = wf!(f32, sample_rate as f32, sine!(frequency, AMPLITUDE));
            let mut samples = waveform.iter();
            while running.load(Ordering::SeqCst) {
                let block: Vec<f32> = samples.by_ref().take(block_len).collect();
                sender.send_block(AudioBlock::new(block, sample_rate));
                thread::sleep(period);
            }
        })
        .context("failed to spawn tone generator")
}
