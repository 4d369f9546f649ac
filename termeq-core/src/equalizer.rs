//! # Three-Band Equalizer
//!
//! Per-bin gain shaping of a transformed spectrum. Every bin is
//! classified into bass, mid, or treble by its center frequency
//! `i·rate/N` and multiplied by the matching gain.

use anyhow::{Result, ensure};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Upper edge of the bass band in Hz.
pub const BASS_CUTOFF_HZ: f64 = 250.0;
/// Upper edge of the mid band in Hz; everything above is treble.
pub const TREBLE_CUTOFF_HZ: f64 = 4000.0;

/// Gain multipliers for the three frequency bands.
///
/// Gains are plain amplitude multipliers: 1.0 passes a band through,
/// 0.0 silences it, values above 1.0 boost it. Loadable from a JSON
/// preset file; missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqSettings {
    pub bass_gain: f32,
    pub mid_gain: f32,
    pub treble_gain: f32,
}

impl Default for EqSettings {
    /// Warm default voicing: boosted bass, flat mids, softened treble.
    fn default() -> Self {
        Self {
            bass_gain: 1.5,
            mid_gain: 1.0,
            treble_gain: 0.5,
        }
    }
}

impl EqSettings {
    /// Rejects negative or non-finite gains before the pipeline starts.
    pub fn validate(&self) -> Result<()> {
        for (name, gain) in [
            ("bass", self.bass_gain),
            ("mid", self.mid_gain),
            ("treble", self.treble_gain),
        ] {
            ensure!(
                gain.is_finite() && gain >= 0.0,
                "{name} gain must be a non-negative finite number, got {gain}"
            );
        }
        Ok(())
    }

    /// Gain for a bin centered at `freq` Hz.
    pub fn gain_for(&self, freq: f64) -> f32 {
        if freq < BASS_CUTOFF_HZ {
            self.bass_gain
        } else if freq < TREBLE_CUTOFF_HZ {
            self.mid_gain
        } else {
            self.treble_gain
        }
    }
}

/// Scales every bin of `spectrum` by the gain of its band, in place.
///
/// The band comes from the raw bin index over the full transform
/// length, so bins in the mirrored upper half (negative frequencies)
/// are classified by `i·rate/N` as well, not by their aliased
/// frequency.
pub fn apply_eq(spectrum: &mut [Complex<f64>], sample_rate: u32, eq: &EqSettings) {
    let n = spectrum.len();
    for (i, bin) in spectrum.iter_mut().enumerate() {
        let freq = i as f64 * sample_rate as f64 / n as f64;
        *bin *= eq.gain_for(freq) as f64;
    }
}
