//! # Terminal Spectrum Visualizer
//!
//! Reduces a magnitude sequence to a fixed number of log-scaled bar
//! heights and renders them as lines of `*` characters, lowest
//! frequency first.

use std::io::{self, Write};

/// Offset added to a decibel value before scaling to characters.
const DB_OFFSET: f32 = 60.0;
/// Decibels per character of bar height.
const DB_PER_CHAR: f32 = 2.0;
/// Keeps `log10` defined when a group of bins is completely silent.
const SILENCE_EPSILON: f32 = 1e-9;

/// Computes one height per element of `out` from `magnitudes`.
///
/// The magnitude sequence is split into `out.len()` contiguous groups
/// of `magnitudes.len() / out.len()` bins (integer division; trailing
/// bins beyond the last full group are not shown). Each group's
/// arithmetic mean maps to `floor((20·log10(mean + ε) + 60) / 2)`,
/// clamped to `[0, max_height]`.
pub fn bar_heights_into(magnitudes: &[f32], max_height: usize, out: &mut [usize]) {
    let step = magnitudes.len() / out.len();
    debug_assert!(step >= 1, "more bars than magnitude bins");

    for (bar, slot) in out.iter_mut().enumerate() {
        let group = &magnitudes[bar * step..(bar + 1) * step];
        let mean = group.iter().sum::<f32>() / step as f32;

        let db = 20.0 * (mean + SILENCE_EPSILON).log10();
        let height = ((db + DB_OFFSET) / DB_PER_CHAR).floor();

        *slot = if height <= 0.0 {
            0
        } else {
            (height as usize).min(max_height)
        };
    }
}

/// Writes one line of `*` per bar.
pub fn render<W: Write>(heights: &[usize], out: &mut W) -> io::Result<()> {
    for &height in heights {
        writeln!(out, "{}", "*".repeat(height))?;
    }
    Ok(())
}
