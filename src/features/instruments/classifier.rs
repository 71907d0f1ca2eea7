//! Instrument-family classification
//!
//! Two heuristic families, each decided on whole-signal averages of
//! per-window statistics (no per-window voting):
//!
//! - **Guitar** (plucked/percussive string): fraction of transient windows
//!   above `plucked_transient_rate` AND average 80-1000 Hz energy above
//!   `plucked_band_energy`
//! - **Piano** (sustained, harmonic-rich): fraction of sharp-attack windows
//!   above `sustained_attack_rate` AND fraction of windows with energy in all
//!   of the low/mid/high bands above `sustained_wide_range_rate`
//!
//! When neither predicate holds, the configured default tag is returned, so
//! the result is never empty. The thresholds are conservative heuristics, not
//! a trained classifier.

use rayon::prelude::*;

use super::bands::{band_energy, normalized_spectrum};
use super::transient::window_transients;
use crate::analysis::result::InstrumentTag;
use crate::config::InstrumentThresholds;
use crate::error::AnalysisError;
use crate::spectral::hann_window;

/// Whole-signal averages feeding the family predicates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstrumentEvidence {
    /// Number of complete analysis windows
    pub windows: usize,
    /// Fraction of windows whose max sample delta exceeds the transient threshold
    pub transient_rate: f32,
    /// Fraction of windows whose attack level exceeds the attack threshold
    pub attack_rate: f32,
    /// Average per-window energy in the plucked band
    pub plucked_band_energy: f32,
    /// Fraction of windows with energy across the low, mid and high bands
    pub wide_range_rate: f32,
}

impl InstrumentEvidence {
    /// Gather evidence from non-overlapping windows of `channel`
    ///
    /// A trailing partial window is ignored; a channel shorter than one
    /// window yields all-zero evidence.
    pub fn collect(
        channel: &[f32],
        sample_rate: u32,
        thresholds: &InstrumentThresholds,
    ) -> Result<Self, AnalysisError> {
        let size = thresholds.window_size;
        if size == 0 || channel.len() < size {
            log::debug!(
                "Channel of {} samples is shorter than one {}-sample window",
                channel.len(),
                size
            );
            return Ok(Self::default());
        }

        let hann = hann_window(size);

        let per_window = channel
            .par_chunks_exact(size)
            .map(|window| window_evidence(window, sample_rate, &hann, thresholds))
            .collect::<Result<Vec<_>, AnalysisError>>()?;

        let windows = per_window.len();
        let count = windows as f32;
        let rate = |hits: usize| hits as f32 / count;

        Ok(Self {
            windows,
            transient_rate: rate(per_window.iter().filter(|w| w.transient).count()),
            attack_rate: rate(per_window.iter().filter(|w| w.sharp_attack).count()),
            plucked_band_energy: per_window.iter().map(|w| w.plucked_energy).sum::<f32>() / count,
            wide_range_rate: rate(per_window.iter().filter(|w| w.wide_range).count()),
        })
    }

    /// Plucked/percussive string predicate
    pub fn is_plucked(&self, thresholds: &InstrumentThresholds) -> bool {
        self.transient_rate > thresholds.plucked_transient_rate
            && self.plucked_band_energy > thresholds.plucked_band_energy
    }

    /// Sustained harmonic-rich predicate
    pub fn is_sustained(&self, thresholds: &InstrumentThresholds) -> bool {
        self.attack_rate > thresholds.sustained_attack_rate
            && self.wide_range_rate > thresholds.sustained_wide_range_rate
    }
}

/// Statistics of a single analysis window
#[derive(Debug, Clone, Copy)]
struct WindowEvidence {
    transient: bool,
    sharp_attack: bool,
    plucked_energy: f32,
    wide_range: bool,
}

fn window_evidence(
    window: &[f32],
    sample_rate: u32,
    hann: &[f32],
    thresholds: &InstrumentThresholds,
) -> Result<WindowEvidence, AnalysisError> {
    let transients = window_transients(window, thresholds.attack_samples);
    let spectrum = normalized_spectrum(window, hann)?;
    let band = |range: (f32, f32)| band_energy(&spectrum, sample_rate, window.len(), range);

    let wide_range = thresholds
        .wide_range_bands_hz
        .iter()
        .zip(&thresholds.wide_range_minimums)
        .all(|(&range, &minimum)| band(range) > minimum);

    Ok(WindowEvidence {
        transient: transients.max_delta > thresholds.transient_delta,
        sharp_attack: transients.attack_level > thresholds.attack_level,
        plucked_energy: band(thresholds.plucked_band_hz),
        wide_range,
    })
}

/// Classify the instrument families present in a mono channel
///
/// # Returns
///
/// Detected tags in fixed order (Guitar, then Piano); `[default_tag]` if no
/// family is detected. Never empty.
///
/// # Errors
///
/// `EmptySignal` for an empty channel, `InvalidInput` for a zero sample rate,
/// `InvalidSize` if the window size is not a power of two.
///
/// # Example
///
/// ```
/// use harmonic_dsp::analysis::result::InstrumentTag;
/// use harmonic_dsp::config::InstrumentThresholds;
/// use harmonic_dsp::features::instruments::classify_instruments;
///
/// let silence = vec![0.0f32; 44100];
/// let tags = classify_instruments(
///     &silence,
///     44100,
///     &InstrumentThresholds::default(),
///     InstrumentTag::Guitar,
/// )?;
/// assert_eq!(tags, vec![InstrumentTag::Guitar]);
/// # Ok::<(), harmonic_dsp::AnalysisError>(())
/// ```
pub fn classify_instruments(
    channel: &[f32],
    sample_rate: u32,
    thresholds: &InstrumentThresholds,
    default_tag: InstrumentTag,
) -> Result<Vec<InstrumentTag>, AnalysisError> {
    if channel.is_empty() {
        return Err(AnalysisError::EmptySignal(
            "Cannot classify an empty channel".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    if thresholds.window_size == 0 || !thresholds.window_size.is_power_of_two() {
        return Err(AnalysisError::InvalidSize(format!(
            "Instrument window size must be a power of two, got {}",
            thresholds.window_size
        )));
    }

    let evidence = InstrumentEvidence::collect(channel, sample_rate, thresholds)?;
    log::debug!("Instrument evidence: {:?}", evidence);

    let mut tags = Vec::with_capacity(2);
    if evidence.is_plucked(thresholds) {
        tags.push(InstrumentTag::Guitar);
    }
    if evidence.is_sustained(thresholds) {
        tags.push(InstrumentTag::Piano);
    }

    if tags.is_empty() {
        log::debug!("No instrument family detected, asserting {}", default_tag);
        tags.push(default_tag);
    }

    Ok(tags)
}
