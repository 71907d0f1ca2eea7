//! Signal conditioning utilities
//!
//! - RMS measurement and soft-clipped RMS normalization
//! - Channel mixing (stereo to mono, mid/side width)

pub mod channel_mixer;
pub mod normalization;
