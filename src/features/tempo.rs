//! Heuristic tempo estimate
//!
//! A deliberately simple amplitude-envelope estimate, not a beat tracker.
//!
//! # Algorithm
//!
//! 1. Mean absolute amplitude per 2048-sample frame, hop 512 (frames must fit
//!    entirely inside the signal)
//! 2. Peaks: interior local maxima above 1.5 x the mean envelope
//! 3. Average interval between consecutive peaks, converted to BPM and rounded
//! 4. Fall back to 120 BPM with fewer than two peaks or a result outside
//!    60-200 BPM (exclusive)
//!
//! # Example
//!
//! ```
//! use harmonic_dsp::features::tempo::{estimate_tempo, FALLBACK_BPM};
//!
//! let silence = vec![0.0f32; 44100 * 4];
//! assert_eq!(estimate_tempo(&silence, 44100)?, FALLBACK_BPM);
//! # Ok::<(), harmonic_dsp::AnalysisError>(())
//! ```

use crate::error::AnalysisError;

/// Envelope frame length in samples
pub const TEMPO_FRAME_SIZE: usize = 2048;

/// Envelope hop in samples
pub const TEMPO_HOP_SIZE: usize = 512;

/// Tempo reported when no plausible estimate is found
pub const FALLBACK_BPM: f32 = 120.0;

/// Peak threshold relative to the mean envelope
const PEAK_FACTOR: f32 = 1.5;

/// Plausible tempo range (exclusive bounds)
const MIN_BPM: f32 = 60.0;
const MAX_BPM: f32 = 200.0;

/// Estimate the tempo of a mono signal in BPM
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// Whole-number BPM in (60, 200), or [`FALLBACK_BPM`]
///
/// # Errors
///
/// `EmptySignal` for empty input, `InvalidInput` for a zero sample rate
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> Result<f32, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptySignal(
            "Cannot estimate tempo of an empty signal".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let envelope = amplitude_envelope(samples);
    if envelope.len() < 3 {
        log::debug!(
            "Signal too short for tempo estimate ({} samples), using {} BPM",
            samples.len(),
            FALLBACK_BPM
        );
        return Ok(FALLBACK_BPM);
    }

    let peaks = envelope_peaks(&envelope);
    if peaks.len() < 2 {
        log::debug!("Found {} envelope peaks, using {} BPM", peaks.len(), FALLBACK_BPM);
        return Ok(FALLBACK_BPM);
    }

    // Sum of consecutive intervals telescopes to last - first
    let average_interval = (peaks[peaks.len() - 1] - peaks[0]) as f32 / (peaks.len() - 1) as f32;
    let seconds_per_beat = average_interval * TEMPO_HOP_SIZE as f32 / sample_rate as f32;
    let bpm = (60.0 / seconds_per_beat).round();

    log::debug!(
        "Tempo estimate: {} peaks, average interval {:.2} frames -> {} BPM",
        peaks.len(),
        average_interval,
        bpm
    );

    if bpm > MIN_BPM && bpm < MAX_BPM {
        Ok(bpm)
    } else {
        Ok(FALLBACK_BPM)
    }
}

/// Mean absolute amplitude of each full frame
fn amplitude_envelope(samples: &[f32]) -> Vec<f32> {
    if samples.len() <= TEMPO_FRAME_SIZE {
        return Vec::new();
    }

    (0..samples.len() - TEMPO_FRAME_SIZE)
        .step_by(TEMPO_HOP_SIZE)
        .map(|start| {
            let frame = &samples[start..start + TEMPO_FRAME_SIZE];
            frame.iter().map(|x| x.abs()).sum::<f32>() / TEMPO_FRAME_SIZE as f32
        })
        .collect()
}

/// Indices of interior local maxima above `PEAK_FACTOR` x mean
fn envelope_peaks(envelope: &[f32]) -> Vec<usize> {
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let threshold = mean * PEAK_FACTOR;

    envelope
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > threshold && w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}
