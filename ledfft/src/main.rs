use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use micro_viz::{block_channel, config::PRESETS, run_blocks, MemoryStrip, VisualizerEngine};
use tracing::{info, warn};
use tracing_subscriber::filter::{Directive, EnvFilter};

mod audio;
mod settings;
mod terminal;
mod tone;

use terminal::TerminalStrip;

/// Pixels driven when the config leaves `led_count` to the strip.
const DEFAULT_PIXELS: usize = 32;

/// Blocks the capture side may queue ahead of the engine.
const QUEUE_BLOCKS: usize = 8;

#[derive(Debug, Parser)]
#[command(name = "ledfft", version, about = "Music-reactive LED strip driven by live audio")]
struct Args {
    /// Preset to start from
    #[arg(short, long, default_value = "spectrum")]
    preset: String,

    /// TOML file whose keys override the preset
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input device name (defaults to the system input)
    #[arg(short, long)]
    device: Option<String>,

    /// Feed a synthetic sine at this frequency instead of capturing audio
    #[arg(long, value_name = "HZ")]
    tone: Option<f32>,

    /// Render into memory instead of the terminal
    #[arg(long)]
    headless: bool,

    #[arg(long)]
    list_devices: bool,

    #[arg(long)]
    list_presets: bool,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

enum Source {
    Device(cpal::Stream),
    Tone(std::thread::JoinHandle<()>),
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_presets {
        for name in PRESETS {
            println!("{name}");
        }
        return Ok(());
    }
    if args.list_devices {
        return audio::list_input_devices();
    }

    let config = settings::load(&args.preset, args.config.as_deref())?;
    config
        .validate()
        .context("invalid visualizer configuration")?;
    let period = config.block_period();
    let pixels = config.led_count.unwrap_or(DEFAULT_PIXELS);
    let mut engine = VisualizerEngine::new(config.clone())?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    let (sender, blocks) = block_channel(QUEUE_BLOCKS);
    let source = match args.tone {
        Some(frequency) => Source::Tone(tone::spawn(frequency, &config, sender, running.clone())?),
        None => Source::Device(audio::start_capture(args.device.as_deref(), &config, sender)?),
    };

    let stats = if args.headless {
        let mut strip = MemoryStrip::new(pixels);
        run_blocks(&mut engine, &mut strip, &blocks, &running, period)
    } else {
        let mut strip = TerminalStrip::new(pixels, io::stdout());
        let stats = run_blocks(&mut engine, &mut strip, &blocks, &running, period);
        strip.finish().context("failed to restore terminal")?;
        stats
    };

    running.store(false, Ordering::SeqCst);
    match source {
        Source::Device(stream) => drop(stream),
        Source::Tone(handle) => {
            if handle.join().is_err() {
                warn!("tone generator thread panicked");
            }
        }
    }

    info!(
        frames = stats.frames,
        device_errors = stats.device_errors,
        strip_errors = stats.strip_errors,
        overruns = stats.overruns,
        dropped_blocks = stats.dropped_blocks,
        "stopped"
    );
    Ok(())
}

fn init_logging(default_level: &str) -> Result<()> {
    let directive: Directive = default_level
        .parse()
        .with_context(|| format!("invalid log level `{default_level}`"))?;
    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    // stdout belongs to the terminal strip
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
