//! # termeq — terminal equalizer frontend
//!
//! The main thread owns the processing loop; the cpal device callback
//! only hands sample blocks over a bounded channel. Per block the
//! spectral pipeline renders log-scaled bars to stdout and appends the
//! equalized reconstruction to a WAV file. Offline processing and raw
//! recording reuse the same pieces without the terminal display.

mod cli;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cpal::traits::StreamTrait;
use crossbeam_channel::{after, bounded, select};
use log::{info, warn};

use termeq_core::audio;
use termeq_core::config::PipelineConfig;
use termeq_core::pipeline::{BlockOutcome, SpectralPipeline};
use termeq_core::visualize;
use termeq_core::wav::{WavBlockReader, WavBlockWriter};

use cli::{Cli, Command, LiveArgs, ProcessArgs, RecordArgs};

/// Blocks buffered between the device callback and the processing loop.
const CHANNEL_CAPACITY: usize = 32;

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Live(args) => run_live(args),
        Command::Record(args) => run_record(args),
        Command::Process(args) => run_process(args),
    }
}

/// Live capture: per block, draw the spectrum and write the equalized
/// reconstruction.
fn run_live(args: LiveArgs) -> Result<()> {
    let config = PipelineConfig {
        sample_rate: args.capture.sample_rate,
        channels: args.capture.channels,
        block_size: args.capture.block_size,
        bar_count: args.display.bars,
        max_bar_height: args.display.max_height,
    };
    let eq = args.eq.resolve()?;
    let mut pipeline = SpectralPipeline::new(config.clone(), eq)?;

    // The pipeline reduces input to one channel, so the file is mono.
    let mut writer = WavBlockWriter::create(&args.output, config.sample_rate, 1)?;

    let (block_tx, block_rx) = bounded(CHANNEL_CAPACITY);
    let stream = audio::start_capture(&config, block_tx)?;

    println!("Recording input for {} seconds", args.capture.duration);
    let deadline = after(Duration::from_secs(args.capture.duration));

    let stdout = std::io::stdout();
    loop {
        select! {
            recv(block_rx) -> block => {
                let block = block.context("capture stream closed unexpectedly")?;
                if pipeline.process_block(&block)? == BlockOutcome::Processed {
                    let mut out = stdout.lock();
                    visualize::render(pipeline.bar_heights(), &mut out)?;
                    out.flush()?;
                    writer.write_block(pipeline.output_block())?;
                }
            }
            recv(deadline) -> _ => break,
        }
    }

    stop_stream(stream);
    writer.finalize()?;

    info!(
        "[MAIN] processed {} block(s), skipped {}, wrote {}",
        pipeline.blocks_processed(),
        pipeline.blocks_skipped(),
        args.output.display()
    );
    Ok(())
}

/// Raw capture: write interleaved blocks straight to the file.
fn run_record(args: RecordArgs) -> Result<()> {
    let config = PipelineConfig {
        sample_rate: args.capture.sample_rate,
        channels: args.capture.channels,
        block_size: args.capture.block_size,
        // no visualization in this mode
        bar_count: 1,
        ..Default::default()
    };
    config.validate()?;

    let mut writer = WavBlockWriter::create(&args.output, config.sample_rate, config.channels)?;

    let (block_tx, block_rx) = bounded(CHANNEL_CAPACITY);
    let stream = audio::start_capture(&config, block_tx)?;

    println!("Recording input for {} seconds", args.capture.duration);
    let deadline = after(Duration::from_secs(args.capture.duration));

    let mut blocks = 0u64;
    loop {
        select! {
            recv(block_rx) -> block => {
                let block = block.context("capture stream closed unexpectedly")?;
                writer.write_block(&block)?;
                blocks += 1;
            }
            recv(deadline) -> _ => break,
        }
    }

    stop_stream(stream);
    writer.finalize()?;

    info!("[MAIN] wrote {} block(s) to {}", blocks, args.output.display());
    Ok(())
}

/// Offline processing: equalize a WAV file block by block.
fn run_process(args: ProcessArgs) -> Result<()> {
    let mut reader = WavBlockReader::open(&args.input)?;
    let config = PipelineConfig {
        sample_rate: reader.sample_rate(),
        channels: reader.channels(),
        block_size: args.block_size,
        // no visualization in this mode
        bar_count: 1,
        ..Default::default()
    };
    let eq = args.eq.resolve()?;
    let mut pipeline = SpectralPipeline::new(config.clone(), eq)?;

    // The pipeline analyzes one channel, so the processed file is mono.
    let mut writer = WavBlockWriter::create(&args.output, config.sample_rate, 1)?;

    let mut input = vec![0.0f32; config.samples_per_block()];
    let mut frames_total = 0u64;
    while let Some(frames) = reader.next_block(&mut input)? {
        if pipeline.process_block(&input)? == BlockOutcome::Processed {
            // A zero-padded final block is trimmed back to the frames
            // actually read.
            writer.write_block(&pipeline.output_block()[..frames])?;
        }
        frames_total += frames as u64;
    }

    writer.finalize()?;

    info!(
        "[MAIN] equalized {} frame(s), skipped {} block(s)",
        frames_total,
        pipeline.blocks_skipped()
    );
    println!("Processing done. Saved to {}", args.output.display());
    Ok(())
}

/// Pauses and drops a capture stream, logging instead of failing: by
/// this point the recording is already complete.
fn stop_stream(stream: cpal::Stream) {
    if let Err(err) = stream.pause() {
        warn!("[MAIN] error pausing stream: {err}");
    }
    drop(stream);
}
