//! Vocal attenuation modules
//!
//! Multi-band, time-adaptive spectral attenuation with phase-preserving
//! resynthesis:
//! - Per-bin attenuation gains (band factors, spectral flux, smoothing)
//! - Whole-buffer separation with soft normalization and stereo widening

pub mod attenuation;
pub mod separator;

pub use separator::{separate, separate_channel};
