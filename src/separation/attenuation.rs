//! Per-bin attenuation gains
//!
//! Each positive-frequency bin gets a base gain from the band its frequency
//! falls in:
//!
//! | Band              | Default range   | Gain                              |
//! |-------------------|-----------------|-----------------------------------|
//! | Vocal fundamental | 80-300 Hz       | 0.6                               |
//! | Primary vocal     | 300-3500 Hz     | 0.15..0.5, rising with flux       |
//! | Vocal harmonics   | 3500-8000 Hz    | 0.5                               |
//! | Outside           | everything else | 0.85                              |
//!
//! In the primary band, spectral flux separates transient content (likely an
//! instrument, kept) from sustained content (likely voice, attenuated).
//! The base gain is then exponentially smoothed against the bin's magnitude
//! ratio to the previous frame to damp abrupt changes.
//!
//! Gains are computed from the unmodified magnitudes of all frames, so the
//! lookback never sees already-attenuated values.

use crate::config::SeparatorConfig;
use crate::spectral::{bin_frequency, Spectrum};

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Frequency band a bin falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttenuationBand {
    /// Low vocal fundamental range
    Fundamental,
    /// Primary vocal range, flux-modulated
    Primary,
    /// Vocal harmonics range
    Harmonics,
    /// Outside the vocal bands
    Outside,
}

impl AttenuationBand {
    /// Band for `frequency` given ascending edges `[f0, f1, f2, f3]`
    ///
    /// Edges are inclusive; a frequency on a shared edge belongs to the lower band.
    pub fn classify(frequency: f32, bounds: &[f32; 4]) -> Self {
        if frequency >= bounds[0] && frequency <= bounds[1] {
            AttenuationBand::Fundamental
        } else if frequency > bounds[1] && frequency <= bounds[2] {
            AttenuationBand::Primary
        } else if frequency > bounds[2] && frequency <= bounds[3] {
            AttenuationBand::Harmonics
        } else {
            AttenuationBand::Outside
        }
    }
}

/// Positive magnitude change normalized by the local average
///
/// `max(0, cur - prev) / ((cur + prev) / 2)`, or 0 when both are silent.
pub fn spectral_flux(current: f32, previous: f32) -> f32 {
    let average = (current + previous) * 0.5;
    if average <= EPSILON {
        return 0.0;
    }
    (current - previous).max(0.0) / average
}

/// Band gain before temporal smoothing
pub fn base_attenuation(band: AttenuationBand, flux: f32, config: &SeparatorConfig) -> f32 {
    match band {
        AttenuationBand::Fundamental => config.fundamental_attenuation,
        AttenuationBand::Primary => {
            let flux_factor = (flux * config.flux_gain).min(1.0);
            config.primary_min_attenuation
                + flux_factor * (config.primary_max_attenuation - config.primary_min_attenuation)
        }
        AttenuationBand::Harmonics => config.harmonics_attenuation,
        AttenuationBand::Outside => config.outside_attenuation,
    }
}

/// Blend a gain with the bin's magnitude ratio to the previous frame
///
/// `gain * s + (1 - s) * min(cur / prev, 1)`; a silent previous bin counts
/// as ratio 1. The result is clamped to `[0, 1]` so no bin is amplified.
pub fn smooth_attenuation(attenuation: f32, current: f32, previous: f32, smoothing: f32) -> f32 {
    let ratio = if previous > EPSILON {
        (current / previous).min(1.0)
    } else {
        1.0
    };
    (attenuation * smoothing + (1.0 - smoothing) * ratio).clamp(0.0, 1.0)
}

/// Band of every positive-frequency bin for one sample rate and frame size
///
/// Built once per separation and shared by all channels.
pub fn band_map(sample_rate: u32, frame_size: usize, bounds: &[f32; 4]) -> Vec<AttenuationBand> {
    (0..frame_size / 2)
        .map(|bin| AttenuationBand::classify(bin_frequency(bin, sample_rate, frame_size), bounds))
        .collect()
}

/// Gain for every bin of every frame
///
/// `magnitudes[f][k]` is the unmodified magnitude of bin `k` in frame `f`;
/// `bands[k]` is that bin's band from [`band_map`].
pub fn attenuation_gains(
    magnitudes: &[Vec<f32>],
    bands: &[AttenuationBand],
    config: &SeparatorConfig,
) -> Vec<Vec<f32>> {
    magnitudes
        .iter()
        .enumerate()
        .map(|(index, current)| {
            let previous = index.checked_sub(1).map(|p| &magnitudes[p]);

            current
                .iter()
                .zip(bands)
                .enumerate()
                .map(|(bin, (&mag, &band))| match previous {
                    None => base_attenuation(band, 0.0, config),
                    Some(prev) => {
                        let prev_mag = prev[bin];
                        let flux = spectral_flux(mag, prev_mag);
                        let base = base_attenuation(band, flux, config);
                        smooth_attenuation(base, mag, prev_mag, config.temporal_smoothing)
                    }
                })
                .collect()
        })
        .collect()
}

/// Attenuate the magnitudes of all frames in place, leaving phases untouched
pub fn attenuate_spectra(spectra: &mut [Spectrum], bands: &[AttenuationBand], config: &SeparatorConfig) {
    let magnitudes: Vec<Vec<f32>> = spectra.iter().map(|s| s.magnitudes.clone()).collect();
    let gains = attenuation_gains(&magnitudes, bands, config);

    for (spectrum, frame_gains) in spectra.iter_mut().zip(gains) {
        for (mag, gain) in spectrum.magnitudes.iter_mut().zip(frame_gains) {
            *mag *= gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SeparatorConfig {
        SeparatorConfig::default()
    }

    #[test]
    fn test_band_classification() {
        let bounds = config().band_bounds_hz;
        assert_eq!(AttenuationBand::classify(50.0, &bounds), AttenuationBand::Outside);
        assert_eq!(AttenuationBand::classify(80.0, &bounds), AttenuationBand::Fundamental);
        assert_eq!(AttenuationBand::classify(300.0, &bounds), AttenuationBand::Fundamental);
        assert_eq!(AttenuationBand::classify(1000.0, &bounds), AttenuationBand::Primary);
        assert_eq!(AttenuationBand::classify(5000.0, &bounds), AttenuationBand::Harmonics);
        assert_eq!(AttenuationBand::classify(12000.0, &bounds), AttenuationBand::Outside);
    }

    #[test]
    fn test_spectral_flux() {
        assert_eq!(spectral_flux(0.0, 0.0), 0.0);
        assert_eq!(spectral_flux(1.0, 2.0), 0.0);
        // (2 - 1) / 1.5
        assert!((spectral_flux(2.0, 1.0) - 2.0 / 3.0).abs() < 1e-6);
        // Onset from silence saturates at 2
        assert!((spectral_flux(1.0, 0.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_primary_band_follows_flux() {
        let c = config();
        let sustained = base_attenuation(AttenuationBand::Primary, 0.0, &c);
        let transient = base_attenuation(AttenuationBand::Primary, 1.0, &c);
        let halfway = base_attenuation(AttenuationBand::Primary, 0.25, &c);

        assert!((sustained - 0.15).abs() < 1e-6);
        assert!((transient - 0.5).abs() < 1e-6);
        assert!((halfway - 0.325).abs() < 1e-6);
        assert_eq!(base_attenuation(AttenuationBand::Fundamental, 1.0, &c), 0.6);
        assert_eq!(base_attenuation(AttenuationBand::Harmonics, 1.0, &c), 0.5);
        assert_eq!(base_attenuation(AttenuationBand::Outside, 1.0, &c), 0.85);
    }

    #[test]
    fn test_smoothing() {
        // Steady bin: ratio 1
        assert!((smooth_attenuation(0.15, 1.0, 1.0, 0.7) - 0.405).abs() < 1e-6);
        // Decaying bin pulls the gain down
        assert!((smooth_attenuation(0.5, 0.5, 1.0, 0.7) - 0.5).abs() < 1e-6);
        // Silent previous frame counts as steady
        assert!((smooth_attenuation(0.6, 1.0, 0.0, 0.7) - 0.72).abs() < 1e-6);
        // Growth never amplifies
        assert!(smooth_attenuation(1.0, 10.0, 1.0, 0.7) <= 1.0);
    }

    #[test]
    fn test_first_frame_uses_base_gains() {
        let c = config();
        let frame_size = 8192;
        let magnitudes = vec![vec![1.0f32; frame_size / 2]; 2];
        let bands = band_map(44100, frame_size, &c.band_bounds_hz);
        let gains = attenuation_gains(&magnitudes, &bands, &c);

        // 1000 Hz ~ bin 186
        let bin = (1000.0 / (44100.0 / frame_size as f32)) as usize;
        assert!((gains[0][bin] - 0.15).abs() < 1e-6);
        // Second frame: steady, flux 0, smoothed with ratio 1
        assert!((gains[1][bin] - (0.15 * 0.7 + 0.3)).abs() < 1e-6);
        assert!(gains.iter().flatten().all(|g| (0.0..=1.0).contains(g)));
    }

    #[test]
    fn test_attenuate_preserves_phase() {
        let mut spectra = vec![Spectrum {
            magnitudes: vec![1.0; 4096],
            phases: (0..4096).map(|i| i as f32 * 0.001).collect(),
        }];
        let phases = spectra[0].phases.clone();
        let bands = band_map(44100, 8192, &config().band_bounds_hz);
        attenuate_spectra(&mut spectra, &bands, &config());

        assert_eq!(spectra[0].phases, phases);
        assert!(spectra[0].magnitudes.iter().all(|&m| m < 1.0 && m > 0.0));
    }

    #[test]
    fn test_rising_bin_keeps_more_than_steady_bin() {
        let c = config();
        let frame_size = 8192;
        let bands = band_map(44100, frame_size, &c.band_bounds_hz);

        // Two primary-band bins: one steady, one doubling into frame 1
        let steady = (1000.0 / (44100.0 / frame_size as f32)) as usize;
        let rising = steady + 10;
        assert_eq!(bands[steady], AttenuationBand::Primary);
        assert_eq!(bands[rising], AttenuationBand::Primary);

        let mut magnitudes = vec![vec![1.0f32; frame_size / 2]; 2];
        magnitudes[1][rising] = 2.0;
        let gains = attenuation_gains(&magnitudes, &bands, &c);

        // flux = 1 / 1.5 saturates the primary gain at 0.5; ratio clamps to 1
        assert!((gains[1][rising] - (0.5 * 0.7 + 0.3)).abs() < 1e-6);
        assert!((gains[1][steady] - (0.15 * 0.7 + 0.3)).abs() < 1e-6);
        assert!(gains[1][rising] > gains[1][steady]);
        // Frame 0 has no lookback, so both bins start from the same base gain
        assert_eq!(gains[0][rising], gains[0][steady]);
    }

    #[test]
    fn test_band_map_covers_positive_bins() {
        let bands = band_map(44100, 4096, &config().band_bounds_hz);
        assert_eq!(bands.len(), 2048);
        assert_eq!(bands[0], AttenuationBand::Outside);
        assert_eq!(bands[2047], AttenuationBand::Outside);
    }
}
