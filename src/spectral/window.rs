//! Window functions

use std::f64::consts::PI;

/// Symmetric Hann window: `0.5 * (1 - cos(2*pi*i / (N - 1)))`
///
/// A window of length 0 or 1 is all ones.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }

    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
        .collect()
}
