//! # Radix-2 Fourier Transform
//!
//! In-place iterative Cooley-Tukey transform and its inverse over
//! `Complex<f64>` buffers whose length is a power of two. The iterative
//! bit-reversal formulation is the canonical one here; a recursive
//! reference implementation lives in the test module to pin the two
//! against each other.
//!
//! ## Features
//! - Allocation-free in-place forward and inverse transforms
//! - Deterministic iteration order, no recursion depth to worry about
//! - Exact round-trip up to floating-point rounding

use std::f64::consts::PI;

use num_complex::Complex;

/// Reverses the lowest `log2n` bits of `index`.
///
/// Used to permute a buffer into bit-reversed order before the
/// iterative butterfly stages.
pub fn reverse_bits(index: usize, log2n: u32) -> usize {
    let mut reversed = 0;
    for bit in 0..log2n {
        if (index >> bit) & 1 == 1 {
            reversed |= 1 << (log2n - 1 - bit);
        }
    }
    reversed
}

/// Replaces `signal` with its discrete Fourier transform, in place.
///
/// Decimation in time: a bit-reversal permutation followed by butterfly
/// merges of doubling span, combining even and odd halves via
/// `X[k] = E[k] + W·O[k]` and `X[k + len/2] = E[k] − W·O[k]` with
/// `W = exp(−2πi·k/len)`.
///
/// The length must be a power of two; `PipelineConfig::validate`
/// rejects anything else before a buffer can reach this point. Lengths
/// of 0 and 1 are returned unchanged.
pub fn forward(signal: &mut [Complex<f64>]) {
    let n = signal.len();
    if n <= 1 {
        return;
    }
    debug_assert!(
        n.is_power_of_two(),
        "transform length {n} is not a power of two"
    );

    let log2n = n.trailing_zeros();

    // bit-reversal permutation
    for i in 0..n {
        let j = reverse_bits(i, log2n);
        if i < j {
            signal.swap(i, j);
        }
    }

    // butterfly stages of doubling span
    let mut len = 2;
    while len <= n {
        let angle = -2.0 * PI / len as f64;
        let wlen = Complex::new(angle.cos(), angle.sin());

        for chunk in signal.chunks_exact_mut(len) {
            let (even, odd) = chunk.split_at_mut(len / 2);
            let mut twiddle = Complex::new(1.0, 0.0);
            for k in 0..len / 2 {
                let e = even[k];
                let o = odd[k] * twiddle;
                even[k] = e + o;
                odd[k] = e - o;
                twiddle *= wlen;
            }
        }

        len <<= 1;
    }
}

/// Recovers the time-domain signal from a spectrum produced by
/// [`forward`], in place.
///
/// Conjugate every element, run the forward transform, conjugate again
/// and scale by `1/N`. Up to floating-point rounding this is an exact
/// algebraic inverse: `inverse(forward(x)) == x`.
pub fn inverse(signal: &mut [Complex<f64>]) {
    let n = signal.len();
    if n <= 1 {
        return;
    }

    for x in signal.iter_mut() {
        *x = x.conj();
    }

    forward(signal);

    let scale = 1.0 / n as f64;
    for x in signal.iter_mut() {
        *x = x.conj() * scale;
    }
}
