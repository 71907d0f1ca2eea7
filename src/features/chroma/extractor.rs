//! Chromagram extraction
//!
//! Folds FFT magnitudes of a time span into a 12-element pitch-class vector.
//!
//! # Algorithm
//!
//! 1. Slice the span `[start, end)` into Hann-windowed frames (hop = frame/2)
//! 2. For each positive-frequency bin strictly inside (20 Hz, 5000 Hz), map the
//!    bin frequency to the nearest MIDI note `69 + 12*log2(f/440)` and fold it
//!    modulo 12
//! 3. Accumulate bin magnitudes per pitch class over all frames
//! 4. Normalize so the entries sum to 1 (silence stays the zero vector)

use serde::{Deserialize, Serialize};

use super::normalization::normalize_sum;
use super::{NOTE_NAMES, PITCH_CLASSES};
use crate::error::AnalysisError;
use crate::spectral::{bin_frequency, FramePipeline, Spectrum};

/// Lowest frequency (exclusive) folded into the chromagram
pub const MIN_CHROMA_FREQUENCY: f32 = 20.0;

/// Highest frequency (exclusive) folded into the chromagram
pub const MAX_CHROMA_FREQUENCY: f32 = 5000.0;

/// Reference tuning: A4 in Hz
const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4
const A4_MIDI: f32 = 69.0;

/// Normalized pitch-class energy distribution (C = 0 ... B = 11)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Chromagram(pub [f32; PITCH_CLASSES]);

impl Chromagram {
    /// The zero vector (no in-range energy)
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a chromagram from raw accumulator values, normalizing to sum 1
    pub fn from_energies(mut energies: [f32; PITCH_CLASSES]) -> Self {
        normalize_sum(&mut energies);
        Self(energies)
    }

    /// Pitch-class values
    pub fn values(&self) -> &[f32; PITCH_CLASSES] {
        &self.0
    }

    /// True when no energy was detected
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Pitch class with the most energy, `None` for the zero vector
    pub fn dominant_pitch_class(&self) -> Option<usize> {
        if self.is_zero() {
            return None;
        }
        let mut best = 0;
        for (pc, &v) in self.0.iter().enumerate() {
            if v > self.0[best] {
                best = pc;
            }
        }
        Some(best)
    }

    /// Note name of the dominant pitch class
    pub fn dominant_note(&self) -> Option<&'static str> {
        self.dominant_pitch_class().map(|pc| NOTE_NAMES[pc])
    }

    /// Dot product with a 12-element weight vector
    pub fn dot(&self, weights: &[f32; PITCH_CLASSES]) -> f32 {
        self.0.iter().zip(weights).map(|(a, b)| a * b).sum()
    }
}

/// Pitch class (0-11) of the MIDI note nearest to `frequency`
///
/// Returns `None` for non-positive or non-finite frequencies.
pub fn frequency_to_pitch_class(frequency: f32) -> Option<usize> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }
    let midi = A4_MIDI + 12.0 * (frequency / A4_FREQUENCY).log2();
    Some((midi.round() as i64).rem_euclid(PITCH_CLASSES as i64) as usize)
}

/// Chroma extraction at a fixed sample rate and frame size
///
/// Holds the frame pipeline (with its Hann window) and the bin-to-pitch-class
/// table, so both are built once and reused for every span.
#[derive(Debug, Clone)]
pub struct ChromaExtractor {
    pipeline: FramePipeline,
    sample_rate: u32,
    bin_classes: Vec<Option<usize>>,
}

impl ChromaExtractor {
    /// Build the tables for `sample_rate` and `frame_size` (hop = frame/2)
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero sample rate, `InvalidSize` if `frame_size`
    /// is not a power of two.
    pub fn new(sample_rate: u32, frame_size: usize) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        let pipeline = FramePipeline::new(frame_size, frame_size / 2)?;
        let bin_classes = (0..frame_size / 2)
            .map(|bin| {
                let freq = bin_frequency(bin, sample_rate, frame_size);
                if freq > MIN_CHROMA_FREQUENCY && freq < MAX_CHROMA_FREQUENCY {
                    frequency_to_pitch_class(freq)
                } else {
                    None
                }
            })
            .collect();

        Ok(Self {
            pipeline,
            sample_rate,
            bin_classes,
        })
    }

    /// Sample rate the tables were built for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// FFT frame size
    pub fn frame_size(&self) -> usize {
        self.pipeline.frame_size()
    }

    /// Pitch class of each positive-frequency bin, `None` outside the chroma band
    pub fn bin_classes(&self) -> &[Option<usize>] {
        &self.bin_classes
    }

    /// Chromagram of `channel` over `[start_time, end_time)`
    ///
    /// Frames are drawn from the span only and zero-padded past its end, so a
    /// span shorter than one frame still contributes one frame.
    ///
    /// # Errors
    ///
    /// `EmptySignal` if `channel` is empty, `InvalidInput` for an invalid
    /// time range.
    pub fn extract(
        &self,
        channel: &[f32],
        start_time: f32,
        end_time: f32,
    ) -> Result<Chromagram, AnalysisError> {
        if channel.is_empty() {
            return Err(AnalysisError::EmptySignal(
                "Cannot extract chroma from an empty channel".to_string(),
            ));
        }

        if !start_time.is_finite() || !end_time.is_finite() || start_time < 0.0 || end_time < start_time {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid time range: [{}, {})",
                start_time, end_time
            )));
        }

        let start = ((start_time * self.sample_rate as f32) as usize).min(channel.len());
        let end = ((end_time * self.sample_rate as f32) as usize).min(channel.len());
        let span = &channel[start..end.max(start)];

        if span.is_empty() {
            log::debug!("Empty chroma span [{:.2}, {:.2}) s", start_time, end_time);
            return Ok(Chromagram::zero());
        }

        log::debug!(
            "Extracting chroma: [{:.2}, {:.2}) s, {} samples at {} Hz, frame={}",
            start_time,
            end_time,
            span.len(),
            self.sample_rate,
            self.frame_size()
        );

        let mut energies = [0.0f32; PITCH_CLASSES];

        for frame in self.pipeline.frames(span) {
            let spectrum = Spectrum::from_frame(&frame.samples)?;
            for (&mag, class) in spectrum.magnitudes.iter().zip(&self.bin_classes) {
                if let Some(pc) = *class {
                    energies[pc] += mag;
                }
            }
        }

        Ok(Chromagram::from_energies(energies))
    }
}

/// Extract the chromagram of `channel` over `[start_time, end_time)`
///
/// One-shot form of [`ChromaExtractor::extract`]; build a `ChromaExtractor`
/// instead when extracting many spans at the same rate and frame size.
///
/// # Arguments
///
/// * `channel` - Mono samples
/// * `start_time` - Span start in seconds
/// * `end_time` - Span end in seconds (clamped to the channel length)
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT frame size (power of two, e.g. 4096)
///
/// # Errors
///
/// - `EmptySignal` if `channel` is empty
/// - `InvalidSize` if `frame_size` is not a power of two
/// - `InvalidInput` for a zero sample rate or an invalid time range
///
/// # Example
///
/// ```
/// use harmonic_dsp::features::chroma::extract_chromagram;
///
/// let sr = 44100;
/// let a4: Vec<f32> = (0..sr)
///     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr as f32).sin())
///     .collect();
/// let chroma = extract_chromagram(&a4, 0.0, 1.0, sr, 4096)?;
/// assert_eq!(chroma.dominant_note(), Some("A"));
/// # Ok::<(), harmonic_dsp::AnalysisError>(())
/// ```
pub fn extract_chromagram(
    channel: &[f32],
    start_time: f32,
    end_time: f32,
    sample_rate: u32,
    frame_size: usize,
) -> Result<Chromagram, AnalysisError> {
    if channel.is_empty() {
        return Err(AnalysisError::EmptySignal(
            "Cannot extract chroma from an empty channel".to_string(),
        ));
    }

    ChromaExtractor::new(sample_rate, frame_size)?.extract(channel, start_time, end_time)
}
