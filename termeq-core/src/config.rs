//! # Pipeline Configuration
//!
//! Immutable run configuration for the spectral pipeline. Built once at
//! process start, validated before the first block is processed, and
//! never adjusted at runtime.

use anyhow::{Result, ensure};

/// Configuration shared by every stage of the spectral pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count delivered by the capture collaborator.
    /// Only the first channel is analyzed.
    pub channels: u16,
    /// Samples per block. Must be a power of two (radix-2 transform)
    /// and at least 2 (Hann window denominator).
    pub block_size: usize,
    /// Number of bars in the terminal spectrum display.
    pub bar_count: usize,
    /// Upper bound for a rendered bar, in characters.
    pub max_bar_height: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            block_size: 256,
            bar_count: 50,
            max_bar_height: 30,
        }
    }
}

impl PipelineConfig {
    /// Rejects configurations the per-block pipeline cannot run with.
    ///
    /// Called from `SpectralPipeline::new`, before any audio is touched;
    /// a bad block size must never be discovered mid-transform.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.sample_rate > 0, "sample rate must be nonzero");
        ensure!(self.channels > 0, "channel count must be nonzero");
        ensure!(
            self.block_size >= 2,
            "block size must be at least 2, got {}",
            self.block_size
        );
        ensure!(
            self.block_size.is_power_of_two(),
            "block size must be a power of two, got {}",
            self.block_size
        );
        ensure!(self.bar_count > 0, "bar count must be nonzero");
        ensure!(
            self.bar_count <= self.block_size / 2,
            "bar count {} exceeds the {} usable spectrum bins",
            self.bar_count,
            self.block_size / 2
        );
        ensure!(self.max_bar_height > 0, "max bar height must be nonzero");
        Ok(())
    }

    /// Interleaved samples per block (`block_size * channels`).
    pub fn samples_per_block(&self) -> usize {
        self.block_size * self.channels as usize
    }

    /// Seconds of audio covered by one block.
    pub fn block_duration_secs(&self) -> f64 {
        self.block_size as f64 / self.sample_rate as f64
    }
}
