//! Radix-2 decimation-in-time FFT
//!
//! In-place forward and inverse transforms over power-of-two buffers.
//!
//! # Algorithm
//!
//! 1. Bit-reversal permutation of the input
//! 2. `log2(N)` butterfly stages, doubling the sub-transform size each stage
//!
//! The inverse is `conj -> forward -> conj * 1/N`, so both directions share
//! one butterfly kernel.
//!
//! # Example
//!
//! ```
//! use harmonic_dsp::spectral::fft::{forward, inverse};
//! use rustfft::num_complex::Complex32;
//!
//! let mut buffer = vec![Complex32::new(1.0, 0.0); 8];
//! forward(&mut buffer)?;
//! assert!((buffer[0].re - 8.0).abs() < 1e-6);
//! inverse(&mut buffer)?;
//! assert!((buffer[3].re - 1.0).abs() < 1e-6);
//! # Ok::<(), harmonic_dsp::AnalysisError>(())
//! ```

use rustfft::num_complex::Complex32;
use std::f64::consts::PI;

use crate::error::AnalysisError;

/// Check that `len` is a usable transform size
///
/// # Errors
///
/// `InvalidSize` if `len` is zero or not a power of two.
pub fn validate_size(len: usize) -> Result<(), AnalysisError> {
    if len == 0 {
        return Err(AnalysisError::InvalidSize(
            "Transform input is empty".to_string(),
        ));
    }
    if !len.is_power_of_two() {
        return Err(AnalysisError::InvalidSize(format!(
            "Transform size must be a power of two, got {}",
            len
        )));
    }
    Ok(())
}

/// Forward DFT in place
///
/// Uses the `e^{-2*pi*i*k*n/N}` sign convention with no scaling.
pub fn forward(buffer: &mut [Complex32]) -> Result<(), AnalysisError> {
    validate_size(buffer.len())?;
    transform(buffer);
    Ok(())
}

/// Inverse DFT in place, scaled by `1/N`
pub fn inverse(buffer: &mut [Complex32]) -> Result<(), AnalysisError> {
    validate_size(buffer.len())?;

    for value in buffer.iter_mut() {
        *value = value.conj();
    }

    transform(buffer);

    let scale = 1.0 / buffer.len() as f32;
    for value in buffer.iter_mut() {
        *value = value.conj() * scale;
    }
    Ok(())
}

/// Magnitudes of the positive-frequency bins (`N/2` values) of a real frame
///
/// The frame is transformed as given; apply any window beforehand.
pub fn magnitude_spectrum(frame: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    validate_size(frame.len())?;

    let mut buffer: Vec<Complex32> = frame.iter().map(|&x| Complex32::new(x, 0.0)).collect();
    transform(&mut buffer);

    Ok(buffer[..frame.len() / 2].iter().map(|c| c.norm()).collect())
}

fn transform(buffer: &mut [Complex32]) {
    let n = buffer.len();
    if n <= 1 {
        return;
    }

    bit_reverse_permute(buffer);

    // Twiddles computed in f64 so the f32 butterflies stay within tolerance at large N
    let twiddles: Vec<Complex32> = (0..n / 2)
        .map(|k| {
            let angle = -2.0 * PI * k as f64 / n as f64;
            Complex32::new(angle.cos() as f32, angle.sin() as f32)
        })
        .collect();

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = n / size;

        for start in (0..n).step_by(size) {
            for j in 0..half {
                let t = buffer[start + j + half] * twiddles[j * step];
                let u = buffer[start + j];
                buffer[start + j] = u + t;
                buffer[start + j + half] = u - t;
            }
        }

        size *= 2;
    }
}

fn bit_reverse_permute(buffer: &mut [Complex32]) {
    let n = buffer.len();
    let bits = n.trailing_zeros();
    let shift = usize::BITS - bits;

    for i in 0..n {
        let j = i.reverse_bits() >> shift;
        if i < j {
            buffer.swap(i, j);
        }
    }
}
