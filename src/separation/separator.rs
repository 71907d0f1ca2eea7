//! Spectral separator
//!
//! Produces an "instrumental" version of a buffer by attenuating
//! vocal-dominant spectral regions.
//!
//! # Algorithm (per channel, independently)
//!
//! 1. Analysis: Hann-windowed frames (frame >= 4096, hop = frame/4), storing
//!    every frame's magnitude and phase
//! 2. Processing: per-bin band gains, flux-modulated in the primary vocal
//!    range and smoothed across frames
//! 3. Synthesis: attenuated magnitude + unmodified phase, conjugate-mirrored,
//!    inverse FFT, windowed overlap-add
//! 4. Soft RMS normalization with `tanh` saturation
//!
//! Stereo input then gets a mid/side width boost. Each call is a pure
//! function of its input and configuration.
//!
//! # Example
//!
//! ```
//! use harmonic_dsp::config::SeparatorConfig;
//! use harmonic_dsp::io::AudioBuffer;
//! use harmonic_dsp::separation::separate;
//!
//! let input = AudioBuffer::new(vec![vec![0.0; 20_000], vec![0.0; 20_000]], 44100)?;
//! let instrumental = separate(&input, &SeparatorConfig::default())?;
//! assert_eq!(instrumental.channel_count(), 2);
//! assert_eq!(instrumental.len(), 20_000);
//! # Ok::<(), harmonic_dsp::AnalysisError>(())
//! ```

use rayon::prelude::*;

use super::attenuation::{attenuate_spectra, band_map, AttenuationBand};
use crate::config::SeparatorConfig;
use crate::error::AnalysisError;
use crate::io::AudioBuffer;
use crate::preprocessing::channel_mixer::widen_stereo;
use crate::preprocessing::normalization::{soft_normalize, SoftNormalization};
use crate::spectral::FramePipeline;

/// Separate a buffer into its instrumental estimate
///
/// Channels are processed in parallel. The frame pipeline and the bin band
/// table are built once and shared by every channel. The output has the same
/// channel count, length and sample rate as the input.
///
/// # Errors
///
/// `InvalidSize`/`InvalidInput` if `config` fails validation. No output is
/// produced on error.
pub fn separate(input: &AudioBuffer, config: &SeparatorConfig) -> Result<AudioBuffer, AnalysisError> {
    config.validate()?;

    let hop_size = config.hop_size();
    log::debug!(
        "Separating {} channel(s) x {} samples at {} Hz (frame={}, hop={})",
        input.channel_count(),
        input.len(),
        input.sample_rate(),
        config.frame_size,
        hop_size
    );

    let pipeline = FramePipeline::new(config.frame_size, hop_size)?;
    let bands = band_map(input.sample_rate(), config.frame_size, &config.band_bounds_hz);

    let mut channels = input
        .channels()
        .par_iter()
        .map(|channel| process_channel(channel, &pipeline, &bands, config))
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    if let [left, right] = channels.as_mut_slice() {
        widen_stereo(left, right, config.stereo_width_factor);
    }

    AudioBuffer::new(channels, input.sample_rate())
}

/// Separate one channel: analysis, attenuation, resynthesis, soft normalization
///
/// # Errors
///
/// `EmptySignal` for an empty channel, `InvalidSize` for an unusable frame
/// or hop size, `InvalidInput` for a zero sample rate.
pub fn separate_channel(
    channel: &[f32],
    sample_rate: u32,
    config: &SeparatorConfig,
) -> Result<Vec<f32>, AnalysisError> {
    if channel.is_empty() {
        return Err(AnalysisError::EmptySignal(
            "Cannot separate an empty channel".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let pipeline = FramePipeline::new(config.frame_size, config.hop_size())?;
    let bands = band_map(sample_rate, config.frame_size, &config.band_bounds_hz);
    process_channel(channel, &pipeline, &bands, config)
}

fn process_channel(
    channel: &[f32],
    pipeline: &FramePipeline,
    bands: &[AttenuationBand],
    config: &SeparatorConfig,
) -> Result<Vec<f32>, AnalysisError> {
    let mut spectra = pipeline.analyze(channel)?;
    attenuate_spectra(&mut spectra, bands, config);

    let frames = spectra
        .iter()
        .map(|spectrum| spectrum.synthesize())
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    let mut output = pipeline.overlap_add(&frames, channel.len());
    soft_normalize(&mut output, &SoftNormalization::from(config));

    Ok(output)
}
