//! Banded spectral energy
//!
//! Sums Hann-windowed FFT magnitudes over fixed frequency bands. Magnitudes
//! are scaled by `2 / sum(window)`, so a full-scale sine reads about 1.0 at
//! its peak bin regardless of window size.

use crate::error::AnalysisError;
use crate::spectral::{bin_frequency, magnitude_spectrum};

/// Amplitude-normalized magnitude spectrum of one window
pub fn normalized_spectrum(window: &[f32], hann: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    let windowed: Vec<f32> = window.iter().zip(hann).map(|(x, w)| x * w).collect();
    let mut spectrum = magnitude_spectrum(&windowed)?;

    let window_sum: f32 = hann.iter().sum();
    if window_sum > 0.0 {
        let scale = 2.0 / window_sum;
        spectrum.iter_mut().for_each(|m| *m *= scale);
    }
    Ok(spectrum)
}

/// Sum of magnitudes over bins with frequency in `[low, high)`
pub fn band_energy(
    spectrum: &[f32],
    sample_rate: u32,
    frame_size: usize,
    (low, high): (f32, f32),
) -> f32 {
    spectrum
        .iter()
        .enumerate()
        .filter(|&(bin, _)| {
            let freq = bin_frequency(bin, sample_rate, frame_size);
            freq >= low && freq < high
        })
        .map(|(_, &m)| m)
        .sum()
}
