//! # Spectral Pipeline
//!
//! Per-block orchestrator. Windows a captured block, transforms it, and
//! drives the two consumers of the transformed spectrum: the terminal
//! visualization (a read-only magnitude extraction) and the equalized
//! reconstruction written to disk. Magnitudes are extracted before the
//! equalizer mutates the spectrum, so neither branch can observe the
//! other.

use anyhow::{Result, ensure};
use log::{trace, warn};
use num_complex::Complex;

use crate::config::PipelineConfig;
use crate::equalizer::{self, EqSettings};
use crate::{fft, spectrum, visualize};

/// What happened to one captured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block was analyzed; bar heights and the output block are
    /// fresh.
    Processed,
    /// The block contained NaN or infinite samples and was skipped;
    /// bar heights and the output block still describe the previous
    /// block.
    SkippedNonFinite,
}

/// Reusable per-block processing state.
///
/// Every buffer is allocated once at construction; `process_block`
/// itself runs allocation-free so it keeps up with the capture rate.
pub struct SpectralPipeline {
    config: PipelineConfig,
    eq: EqSettings,
    spectrum: Vec<Complex<f64>>,
    magnitudes: Vec<f32>,
    heights: Vec<usize>,
    output: Vec<f32>,
    blocks_processed: u64,
    blocks_skipped: u64,
}

impl SpectralPipeline {
    /// Validates `config` and `eq`, then pre-allocates every buffer the
    /// per-block path needs.
    pub fn new(config: PipelineConfig, eq: EqSettings) -> Result<Self> {
        config.validate()?;
        eq.validate()?;

        Ok(Self {
            spectrum: vec![Complex::new(0.0, 0.0); config.block_size],
            magnitudes: vec![0.0; config.block_size / 2],
            heights: vec![0; config.bar_count],
            output: vec![0.0; config.block_size],
            config,
            eq,
            blocks_processed: 0,
            blocks_skipped: 0,
        })
    }

    /// Runs both branches of the pipeline over one interleaved block.
    ///
    /// `input` must hold exactly `block_size × channels` samples; the
    /// capture and file collaborators only deliver full blocks.
    pub fn process_block(&mut self, input: &[f32]) -> Result<BlockOutcome> {
        ensure!(
            input.len() == self.config.samples_per_block(),
            "expected {} interleaved samples per block, got {}",
            self.config.samples_per_block(),
            input.len()
        );

        if input.iter().any(|s| !s.is_finite()) {
            self.blocks_skipped += 1;
            warn!("[PIPELINE] skipping block with non-finite samples");
            return Ok(BlockOutcome::SkippedNonFinite);
        }

        spectrum::window_into(input, self.config.channels as usize, &mut self.spectrum);
        fft::forward(&mut self.spectrum);

        // Visualization branch: reads the spectrum before the equalizer
        // touches it.
        spectrum::magnitudes_into(&self.spectrum, &mut self.magnitudes);
        visualize::bar_heights_into(
            &self.magnitudes,
            self.config.max_bar_height,
            &mut self.heights,
        );

        // Processing branch: shape, invert, take the real parts.
        equalizer::apply_eq(&mut self.spectrum, self.config.sample_rate, &self.eq);
        fft::inverse(&mut self.spectrum);

        // The raw-index band split leaves the shaped spectrum slightly
        // asymmetric, so the residue is genuine, not just rounding; it
        // is discarded, not asserted away.
        let mut residue = 0.0f64;
        for (slot, value) in self.output.iter_mut().zip(&self.spectrum) {
            residue = residue.max(value.im.abs());
            *slot = value.re as f32;
        }
        trace!("[PIPELINE] max imaginary residue {residue:.3e}");

        self.blocks_processed += 1;
        Ok(BlockOutcome::Processed)
    }

    /// Bar heights for the most recently processed block.
    pub fn bar_heights(&self) -> &[usize] {
        &self.heights
    }

    /// Magnitude sequence for the most recently processed block.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Equalized, reconstructed samples for the most recently processed
    /// block. Single channel regardless of the input channel count.
    pub fn output_block(&self) -> &[f32] {
        &self.output
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Blocks fully processed so far.
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Blocks dropped by the non-finite guard so far.
    pub fn blocks_skipped(&self) -> u64 {
        self.blocks_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(block_size: usize, bar_count: usize) -> PipelineConfig {
        PipelineConfig {
            block_size,
            bar_count,
            ..Default::default()
        }
    }

    fn unity_eq() -> EqSettings {
        EqSettings {
            bass_gain: 1.0,
            mid_gain: 1.0,
            treble_gain: 1.0,
        }
    }

    #[test]
    fn rejects_invalid_configuration_up_front() {
        assert!(SpectralPipeline::new(config(100, 4), unity_eq()).is_err());
        assert!(
            SpectralPipeline::new(
                config(64, 4),
                EqSettings {
                    mid_gain: -1.0,
                    ..Default::default()
                }
            )
            .is_err()
        );
    }

    #[test]
    fn unity_eq_reconstructs_the_windowed_block() {
        let mut pipeline = SpectralPipeline::new(config(64, 16), unity_eq()).unwrap();
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.37).sin()).collect();

        let outcome = pipeline.process_block(&input).unwrap();

        assert_eq!(outcome, BlockOutcome::Processed);
        for (i, (&got, &raw)) in pipeline.output_block().iter().zip(&input).enumerate() {
            let expected = raw as f64 * spectrum::hann_coefficient(i, 64);
            assert!((got as f64 - expected).abs() < 1e-6, "sample {i}");
        }
    }

    #[test]
    fn nan_block_is_skipped() {
        let mut pipeline = SpectralPipeline::new(config(8, 4), unity_eq()).unwrap();
        let mut input = vec![0.25f32; 8];
        input[3] = f32::NAN;

        let outcome = pipeline.process_block(&input).unwrap();

        assert_eq!(outcome, BlockOutcome::SkippedNonFinite);
        assert_eq!(pipeline.blocks_skipped(), 1);
        assert_eq!(pipeline.blocks_processed(), 0);
    }

    #[test]
    fn wrong_block_length_is_rejected() {
        let mut pipeline = SpectralPipeline::new(config(8, 4), unity_eq()).unwrap();
        assert!(pipeline.process_block(&[0.0; 7]).is_err());
    }

    #[test]
    fn equalizer_gains_do_not_change_the_visualization() {
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.81).cos()).collect();

        let mut flat = SpectralPipeline::new(config(64, 8), unity_eq()).unwrap();
        let shaped_eq = EqSettings {
            bass_gain: 3.0,
            mid_gain: 0.0,
            treble_gain: 9.0,
        };
        let mut shaped = SpectralPipeline::new(config(64, 8), shaped_eq).unwrap();

        flat.process_block(&input).unwrap();
        shaped.process_block(&input).unwrap();

        assert_eq!(flat.bar_heights(), shaped.bar_heights());
    }

    #[test]
    fn second_channel_does_not_affect_the_output() {
        let mono_config = config(32, 8);
        let stereo_config = PipelineConfig {
            channels: 2,
            ..config(32, 8)
        };

        let mono: Vec<f32> = (0..32).map(|i| (i as f32 * 0.49).sin()).collect();
        let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, -s]).collect();

        let mut a = SpectralPipeline::new(mono_config, unity_eq()).unwrap();
        let mut b = SpectralPipeline::new(stereo_config, unity_eq()).unwrap();
        a.process_block(&mono).unwrap();
        b.process_block(&stereo).unwrap();

        assert_eq!(a.output_block(), b.output_block());
        assert_eq!(a.bar_heights(), b.bar_heights());
    }

    #[test]
    fn bar_heights_stay_within_bounds() {
        let cfg = config(128, 16);
        let max = cfg.max_bar_height;
        let mut pipeline = SpectralPipeline::new(cfg, EqSettings::default()).unwrap();
        let loud: Vec<f32> = (0..128)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();

        pipeline.process_block(&loud).unwrap();

        assert!(pipeline.bar_heights().iter().all(|&h| h <= max));
    }
}
