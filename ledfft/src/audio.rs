use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfig};
use micro_dsp::BlockAssembler;
use micro_viz::{BlockSender, VisualizerConfig};
use tracing::{info, warn};

pub fn list_input_devices() -> Result<()> {
    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|device| device.name().ok());

    for device in host.input_devices().context("failed to enumerate input devices")? {
        let name = device.name().unwrap_or_else(|_| "Unknown Device".to_string());
        let marker = if Some(&name) == default_name.as_ref() { "*" } else { " " };
        println!("{marker} {name}");
    }
    Ok(())
}

/// Opens the input device and starts streaming fixed-size mono blocks into
/// `sender`. Capture stops when the returned stream is dropped.
pub fn start_capture(
    device_name: Option<&str>,
    config: &VisualizerConfig,
    sender: BlockSender,
) -> Result<Stream> {
    let device = find_device(device_name)?;
    let supported = pick_stream_config(&device, config.sample_rate)?;
    let sample_format = supported.sample_format();
    let stream_config: StreamConfig = supported.into();

    let sample_rate = stream_config.sample_rate.0;
    let block_len =
        (sample_rate as f64 * config.block_duration_ms as f64 / 1000.0).round() as usize;
    let assembler = BlockAssembler::new(block_len, sample_rate);

    info!(
        device = %device.name().unwrap_or_default(),
        sample_rate,
        channels = stream_config.channels,
        block_len,
        ?sample_format,
        "capturing audio"
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, assembler, sender)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, assembler, sender)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, assembler, sender)?,
        other => bail!("unsupported sample format {other:?}"),
    };
    stream.play().context("failed to start audio stream")?;
    Ok(stream)
}

fn find_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    match name {
        None => host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device found")),
        Some(name) => host
            .input_devices()
            .context("failed to enumerate input devices")?
            .find(|device| device.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| anyhow!("no input device named `{name}`")),
    }
}

/// Prefers a configuration that runs at the requested rate; otherwise the
/// device default is used and blocks are cut at its rate.
fn pick_stream_config(device: &Device, sample_rate: u32) -> Result<SupportedStreamConfig> {
    let matching = device
        .supported_input_configs()
        .context("failed to query input configurations")?
        .find(|range| {
            range.min_sample_rate().0 <= sample_rate
                && sample_rate <= range.max_sample_rate().0
                && matches!(
                    range.sample_format(),
                    SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                )
        });

    match matching {
        Some(range) => Ok(range.with_sample_rate(SampleRate(sample_rate))),
        None => {
            let fallback = device
                .default_input_config()
                .context("no usable input configuration")?;
            warn!(
                requested = sample_rate,
                actual = fallback.sample_rate().0,
                "device does not support the configured sample rate"
            );
            Ok(fallback)
        }
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut assembler: BlockAssembler,
    sender: BlockSender,
) -> Result<Stream>
where
    T: cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let channels = usize::from(config.channels);
    let error_sender = sender.clone();
    let mut converted: Vec<f32> = Vec::new();

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                converted.clear();
                converted.extend(data.iter().map(|&s| -> f32 { cpal::Sample::from_sample(s) }));
                assembler.push_interleaved(&converted, channels, |block| {
                    sender.send_block(block);
                });
            },
            move |err| error_sender.report_error(err.to_string()),
            None,
        )
        .context("failed to build input stream")?;
    Ok(stream)
}
