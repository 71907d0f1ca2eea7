//! RMS measurement and soft normalization
//!
//! Drives a signal towards a target RMS and passes the gained signal through
//! a `tanh` saturator instead of hard clipping, so an overshooting gain
//! compresses peaks rather than distorting them.
//!
//! # Example
//!
//! ```
//! use harmonic_dsp::preprocessing::normalization::{rms, soft_normalize, SoftNormalization};
//!
//! let mut samples: Vec<f32> = (0..44100).map(|i| 0.01 * (i as f32 * 0.05).sin()).collect();
//! let metadata = soft_normalize(&mut samples, &SoftNormalization::default());
//! assert!(metadata.gain > 1.0);
//! assert!(rms(&samples) > 0.05);
//! ```

use crate::config::SeparatorConfig;

/// Guard added to the measured RMS before dividing
const RMS_EPSILON: f32 = 1e-4;

/// Soft normalization parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftNormalization {
    /// RMS the gain is computed against (default: 0.15)
    pub target_rms: f32,
    /// Multiplier applied inside the `tanh` (default: 0.9)
    pub drive: f32,
    /// Multiplier applied after the `tanh` (default: 1.1)
    pub ceiling: f32,
}

impl Default for SoftNormalization {
    fn default() -> Self {
        Self::from(&SeparatorConfig::default())
    }
}

impl From<&SeparatorConfig> for SoftNormalization {
    fn from(config: &SeparatorConfig) -> Self {
        Self {
            target_rms: config.target_rms,
            drive: config.soft_clip_drive,
            ceiling: config.soft_clip_ceiling,
        }
    }
}

/// Levels measured before normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationMetadata {
    /// RMS before normalization
    pub rms: f32,
    /// Peak absolute sample before normalization
    pub peak: f32,
    /// Linear gain applied before saturation
    pub gain: f32,
}

/// Root-mean-square level; 0 for an empty slice
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|&x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Normalize towards the target RMS with `tanh` soft clipping, in place
///
/// Each sample becomes `tanh(x * gain * drive) * ceiling` where
/// `gain = target_rms / (rms + 1e-4)`. Silence maps to silence; output is
/// bounded by `ceiling`.
pub fn soft_normalize(samples: &mut [f32], params: &SoftNormalization) -> NormalizationMetadata {
    let level = rms(samples);
    let peak = samples.iter().map(|&x| x.abs()).fold(0.0f32, f32::max);
    let gain = params.target_rms / (level + RMS_EPSILON);

    if level == 0.0 {
        log::debug!("Signal is silent, soft normalization leaves it at zero");
    }

    for sample in samples.iter_mut() {
        *sample = (*sample * gain * params.drive).tanh() * params.ceiling;
    }

    log::debug!(
        "Soft normalization: rms={:.4}, peak={:.4}, gain={:.2}",
        level,
        peak,
        gain
    );

    NormalizationMetadata { rms: level, peak, gain }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut samples = vec![0.0f32; 1000];
        let metadata = soft_normalize(&mut samples, &SoftNormalization::default());
        assert!(samples.iter().all(|&x| x == 0.0));
        assert_eq!(metadata.rms, 0.0);
        assert!(metadata.gain.is_finite());
    }

    #[test]
    fn test_output_bounded_by_ceiling() {
        let mut samples: Vec<f32> = (0..1000).map(|i| if i % 10 == 0 { 50.0 } else { 0.01 }).collect();
        let params = SoftNormalization::default();
        soft_normalize(&mut samples, &params);
        assert!(samples.iter().all(|x| x.abs() <= params.ceiling + 1e-6));
        assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_quiet_signal_approaches_target() {
        let mut samples: Vec<f32> = (0..44100).map(|i| 0.02 * (i as f32 * 0.031).sin()).collect();
        let params = SoftNormalization::default();
        soft_normalize(&mut samples, &params);

        // Small-signal tanh is ~linear, so RMS lands near target * drive * ceiling
        let expected = params.target_rms * params.drive * params.ceiling;
        let level = rms(&samples);
        assert!((level - expected).abs() < 0.02, "rms {} expected ~{}", level, expected);
    }

    #[test]
    fn test_sign_preserved() {
        let mut samples = vec![0.3f32, -0.3, 0.0];
        soft_normalize(&mut samples, &SoftNormalization::default());
        assert!(samples[0] > 0.0 && samples[1] < 0.0 && samples[2] == 0.0);
        assert!((samples[0] + samples[1]).abs() < 1e-6);
    }
}
