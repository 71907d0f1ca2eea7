//! Spectral transform and frame pipeline
//!
//! The foundation every other component builds on:
//! - Radix-2 forward/inverse FFT over power-of-two sizes
//! - Hann windowing
//! - Frame extraction and overlap-add reconstruction

pub mod fft;
pub mod frames;
pub mod window;

pub use fft::{forward, inverse, magnitude_spectrum};
pub use frames::{Frame, FramePipeline, Spectrum};
pub use window::hann_window;

/// Frequency in Hz of FFT bin `bin`
///
/// Bin `k` corresponds to `k * sample_rate / frame_size`.
#[inline]
pub fn bin_frequency(bin: usize, sample_rate: u32, frame_size: usize) -> f32 {
    bin as f32 * sample_rate as f32 / frame_size as f32
}
