//! # Windowing and Spectrum Analysis
//!
//! Converts a captured sample block into the complex buffer fed to the
//! transform engine, and reduces a transformed buffer to the magnitude
//! sequence consumed by the visualizer.

use std::f64::consts::PI;

use num_complex::Complex;

/// Hann coefficient `0.5·(1 − cos(2π·i/(len − 1)))` for position `i`.
///
/// Tapers a block toward zero at both edges, suppressing the spectral
/// leakage of analyzing a finite segment. `len` must be at least 2;
/// `PipelineConfig::validate` guards the degenerate denominator.
pub fn hann_coefficient(i: usize, len: usize) -> f64 {
    debug_assert!(len >= 2);
    0.5 * (1.0 - (2.0 * PI * i as f64 / (len - 1) as f64).cos())
}

/// Windows one interleaved block into `out`.
///
/// Element `i` of `out` becomes `input[i·channels] · w(i)` with zero
/// imaginary part: for multi-channel input only the first channel is
/// analyzed.
pub fn window_into(input: &[f32], channels: usize, out: &mut [Complex<f64>]) {
    debug_assert!(channels >= 1);
    debug_assert!(out.len() >= 2);
    debug_assert_eq!(input.len(), out.len() * channels);

    let len = out.len();
    for (i, slot) in out.iter_mut().enumerate() {
        let sample = input[i * channels] as f64;
        *slot = Complex::new(sample * hann_coefficient(i, len), 0.0);
    }
}

/// Fills `out` with the modulus of the first `out.len()` spectrum bins.
///
/// A real-valued block produces a conjugate-symmetric spectrum, so only
/// the first half carries information; callers size `out` to
/// `spectrum.len() / 2`.
pub fn magnitudes_into(spectrum: &[Complex<f64>], out: &mut [f32]) {
    debug_assert_eq!(out.len(), spectrum.len() / 2);

    for (slot, bin) in out.iter_mut().zip(spectrum) {
        *slot = bin.norm() as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft;

    #[test]
    fn hann_tapers_to_zero_at_edges() {
        let len = 256;
        assert!(hann_coefficient(0, len).abs() < 1e-12);
        assert!(hann_coefficient(len - 1, len).abs() < 1e-9);
        assert!((hann_coefficient(len / 2, len) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn window_selects_first_channel() {
        // two interleaved channels; channel 1 carries garbage that must
        // be ignored
        let input: Vec<f32> = (0..16).flat_map(|i| [i as f32, 999.0]).collect();
        let mut out = vec![Complex::new(0.0, 0.0); 16];

        window_into(&input, 2, &mut out);

        for (i, value) in out.iter().enumerate() {
            let expected = i as f64 * hann_coefficient(i, 16);
            assert!((value.re - expected).abs() < 1e-9, "element {i}");
            assert_eq!(value.im, 0.0);
        }
    }

    #[test]
    fn magnitude_sequence_is_half_the_spectrum() {
        let spectrum = vec![Complex::new(3.0, 4.0); 64];
        let mut magnitudes = vec![0.0f32; 32];

        magnitudes_into(&spectrum, &mut magnitudes);

        assert!(magnitudes.iter().all(|&m| (m - 5.0).abs() < 1e-6));
    }

    #[test]
    fn windowed_sine_peaks_at_its_bin() {
        let n = 256;
        let bin = 12;
        let input: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / n as f64).sin() as f32)
            .collect();

        let mut spectrum = vec![Complex::new(0.0, 0.0); n];
        window_into(&input, 1, &mut spectrum);
        fft::forward(&mut spectrum);

        let mut magnitudes = vec![0.0f32; n / 2];
        magnitudes_into(&spectrum, &mut magnitudes);

        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!(
            (peak as i64 - bin as i64).abs() <= 1,
            "peak at {peak}, expected near {bin}"
        );
    }
}
