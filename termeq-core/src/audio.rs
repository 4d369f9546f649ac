//! # Audio Capture
//!
//! Real-time capture through cpal (Cross-Platform Audio Library). The
//! device callback only accumulates samples and hands exact blocks to
//! the processing thread over a bounded channel; it never blocks and
//! never touches the DSP path.
//!
//! ## Features
//! - Default-device selection with configurable rate and channel count
//! - Fixed-size block delivery regardless of the device's buffer sizes
//! - Non-blocking hand-off from the real-time callback

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use log::{info, warn};

use crate::config::PipelineConfig;

/// Starts capture from the default input device.
///
/// The callback accumulates interleaved samples and sends one
/// `block_size × channels` block at a time. `try_send` keeps the
/// real-time callback non-blocking: if the consumer falls behind and
/// the channel fills up, the block is dropped. Whatever partial block
/// remains when the stream stops is discarded.
///
/// # Arguments
/// * `config` - Validated pipeline configuration (rate, channels, block size)
/// * `sender` - Channel sender delivering sample blocks to the processing loop
///
/// # Returns
/// * `Ok(stream)` - Live capture stream; keep it alive for the duration
///   of the capture, dropping it stops delivery
/// * `Err(e)` - No device, no matching stream configuration, or the
///   stream could not be built or started
pub fn start_capture(config: &PipelineConfig, sender: Sender<Vec<f32>>) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("no audio input device available"))?;

    info!("[AUDIO] using input device: {}", device.name()?);

    let supported = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported = find_supported_config(supported, config.channels, config.sample_rate)
        .ok_or_else(|| {
            anyhow!(
                "no f32 input config with {} channel(s) at {} Hz",
                config.channels,
                config.sample_rate
            )
        })?;

    let stream_config: cpal::StreamConfig = supported
        .with_sample_rate(cpal::SampleRate(config.sample_rate))
        .into();

    info!(
        "[AUDIO] capturing {} channel(s) at {} Hz, {} samples ({:.1} ms) per block",
        config.channels,
        config.sample_rate,
        config.block_size,
        config.block_duration_secs() * 1000.0
    );

    let samples_per_block = config.samples_per_block();
    let mut accumulator: Vec<f32> = Vec::with_capacity(samples_per_block * 2);

    let err_fn = |err| warn!("[AUDIO] stream error: {err}");

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            accumulator.extend_from_slice(data);

            // Hand off exact blocks; the remainder stays for the next
            // callback.
            while accumulator.len() >= samples_per_block {
                let block = accumulator[..samples_per_block].to_vec();
                let _ = sender.try_send(block);
                accumulator.drain(..samples_per_block);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

/// Picks a supported range with the wanted channel count and f32 format
/// whose sample-rate range contains `sample_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    channels: u16,
    sample_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs.into_iter().find(|c| {
        c.channels() == channels
            && c.sample_format() == cpal::SampleFormat::F32
            && c.min_sample_rate().0 <= sample_rate
            && c.max_sample_rate().0 >= sample_rate
    })
}
