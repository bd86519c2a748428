//! Single-consumer loop feeding audio blocks from a capture thread into a
//! [`VisualizerEngine`].
//!
//! The capture side never blocks: when the queue is full the block is
//! dropped and counted. The loop side checks the stop flag at least once per
//! block period and always leaves the strip dark on exit.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use micro_dsp::AudioBlock;
use tracing::{debug, info, trace, warn};

use crate::engine::{FrameOutcome, VisualizerEngine};
use crate::error::EngineError;
use crate::strip::LedStrip;

/// Queued blocks beyond which a frame counts as behind.
const BACKLOG_LIMIT: usize = 2;

/// Consecutive behind frames before an overrun is reported.
const OVERRUN_FRAMES: u32 = 8;

const FPS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub enum AudioEvent {
    Block(AudioBlock),
    /// Reported by the audio device out of band; the loop keeps running.
    DeviceError(String),
}

/// Producer half of the block queue, cheap to clone into audio callbacks.
#[derive(Debug, Clone)]
pub struct BlockSender {
    tx: Sender<AudioEvent>,
    dropped: Arc<AtomicU64>,
}

impl BlockSender {
    /// Queues a block without blocking. Returns `false` if it was dropped.
    pub fn send_block(&self, block: AudioBlock) -> bool {
        match self.tx.try_send(AudioEvent::Block(block)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn report_error(&self, message: impl Into<String>) {
        // Never blocks; on a full queue the report is lost.
        let _ = self.tx.try_send(AudioEvent::DeviceError(message.into()));
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half of the block queue.
#[derive(Debug)]
pub struct BlockReceiver {
    rx: Receiver<AudioEvent>,
    dropped: Arc<AtomicU64>,
}

impl BlockReceiver {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<AudioEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Blocks waiting to be processed.
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }

    /// Blocks dropped so far because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub fn block_channel(capacity: usize) -> (BlockSender, BlockReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        BlockSender {
            tx,
            dropped: dropped.clone(),
        },
        BlockReceiver { rx, dropped },
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub skipped: u64,
    pub device_errors: u64,
    pub strip_errors: u64,
    pub overruns: u64,
    pub dropped_blocks: u64,
}

/// Processes blocks until `running` is cleared or every sender is gone,
/// then clears the strip.
///
/// Device and strip errors are logged and counted; they never end the loop.
pub fn run_blocks<S>(
    engine: &mut VisualizerEngine,
    strip: &mut S,
    blocks: &BlockReceiver,
    running: &AtomicBool,
    block_period: Duration,
) -> RunStats
where
    S: LedStrip + ?Sized,
{
    let mut stats = RunStats::default();
    let mut behind_frames = 0u32;
    let mut fps_frames = 0u32;
    let mut fps_started = Instant::now();
    let mut reported_drops = 0u64;

    info!(period_ms = block_period.as_millis() as u64, "block loop started");

    while running.load(Ordering::SeqCst) {
        match blocks.recv_timeout(block_period) {
            Ok(AudioEvent::Block(block)) => {
                match engine.process_block(&block, strip) {
                    Ok(FrameOutcome::Rendered) => {
                        stats.frames += 1;
                        fps_frames += 1;
                    }
                    Ok(FrameOutcome::Skipped) => stats.skipped += 1,
                    Err(EngineError::Strip(err)) => {
                        stats.strip_errors += 1;
                        warn!(error = %err, "LED strip write failed");
                    }
                    Err(EngineError::Config(err)) => {
                        stats.strip_errors += 1;
                        warn!(error = %err, "cannot drive the attached strip");
                    }
                }

                let backlog = blocks.backlog();
                if backlog > BACKLOG_LIMIT {
                    behind_frames += 1;
                    if behind_frames == OVERRUN_FRAMES {
                        stats.overruns += 1;
                        warn!(backlog, "block processing is falling behind the audio device");
                    }
                } else {
                    behind_frames = 0;
                }
            }
            Ok(AudioEvent::DeviceError(message)) => {
                stats.device_errors += 1;
                warn!(%message, "audio device error");
            }
            Err(RecvTimeoutError::Timeout) => {
                trace!("no audio block within one period");
            }
            Err(RecvTimeoutError::Disconnected) => {
                info!("audio source closed");
                break;
            }
        }

        if fps_started.elapsed() >= FPS_INTERVAL {
            let fps = fps_frames as f32 / fps_started.elapsed().as_secs_f32();
            debug!(fps, frames = stats.frames, "frame rate");
            let dropped = blocks.dropped();
            if dropped > reported_drops {
                warn!(dropped = dropped - reported_drops, "audio blocks dropped, queue full");
                reported_drops = dropped;
            }
            fps_frames = 0;
            fps_started = Instant::now();
        }
    }

    if let Err(err) = engine.shutdown(strip) {
        stats.strip_errors += 1;
        warn!(error = %err, "failed to clear LED strip on shutdown");
    }
    stats.dropped_blocks = blocks.dropped();
    info!(?stats, "block loop stopped");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_queue_drops_and_counts() {
        let (tx, rx) = block_channel(1);
        assert!(tx.send_block(AudioBlock::new(vec![0.0; 4], 44_100)));
        assert!(!tx.send_block(AudioBlock::new(vec![0.0; 4], 44_100)));
        assert_eq!(tx.dropped(), 1);
        assert_eq!(rx.dropped(), 1);
        assert_eq!(rx.backlog(), 1);
    }

    #[test]
    fn test_send_after_receiver_gone_is_not_a_drop() {
        let (tx, rx) = block_channel(4);
        drop(rx);
        assert!(!tx.send_block(AudioBlock::new(vec![0.0; 4], 44_100)));
        assert_eq!(tx.dropped(), 0);
    }
}
