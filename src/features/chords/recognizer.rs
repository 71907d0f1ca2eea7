//! Chord timeline recognition
//!
//! Partitions a channel into fixed windows, matches each window's chromagram
//! against the chord templates, and merges adjacent windows with the same
//! label into one segment.
//!
//! # Algorithm
//!
//! 1. Split `[0, duration)` into windows of `window_seconds` (last one truncated)
//! 2. Extract a chromagram per window
//! 3. Score all 24 templates; keep the best if its score exceeds the threshold
//! 4. Extend the previous segment when the label repeats, else start a new one
//!
//! Windows below threshold contribute nothing. Merging only looks at the last
//! accepted segment, so a gap closes when the same label returns after it
//! (C, silence, C yields one C segment spanning all three windows); a gap
//! stays open only when a different label follows.

use super::templates::ChordTemplates;
use crate::analysis::result::{Chord, ChordSegment, InstrumentTag};
use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::features::chroma::{ChromaExtractor, Chromagram};

/// Chord recognizer holding its templates and thresholds
#[derive(Debug, Clone)]
pub struct ChordRecognizer {
    templates: ChordTemplates,
    window_seconds: f32,
    accept_threshold: f32,
    frame_size: usize,
    default_instrument: InstrumentTag,
}

impl ChordRecognizer {
    /// Build a recognizer from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_templates(ChordTemplates::new(), config)
    }

    /// Build a recognizer around prebuilt templates
    pub fn with_templates(templates: ChordTemplates, config: &EngineConfig) -> Self {
        Self {
            templates,
            window_seconds: config.chord_window_seconds,
            accept_threshold: config.chord_accept_threshold,
            frame_size: config.analysis_frame_size,
            default_instrument: config.default_instrument,
        }
    }

    /// The templates scored against each window
    pub fn templates(&self) -> &ChordTemplates {
        &self.templates
    }

    /// Best chord for a chromagram, if its score exceeds the threshold
    pub fn classify(&self, chroma: &Chromagram) -> Option<(Chord, f32)> {
        self.templates
            .best_match(chroma)
            .filter(|&(_, score)| score > self.accept_threshold)
    }

    /// Recognize the chord timeline of a mono channel
    ///
    /// Every segment is tagged with the first entry of `instruments`, or the
    /// configured default tag when `instruments` is empty. The chroma tables
    /// are built once for `sample_rate` and shared by all windows.
    ///
    /// # Arguments
    ///
    /// * `channel` - Mono samples
    /// * `sample_rate` - Sample rate in Hz
    /// * `duration` - Length of the span to analyze in seconds
    /// * `instruments` - Detected instrument tags, in detection order
    ///
    /// # Errors
    ///
    /// Propagates chroma extraction errors; `InvalidInput` for a negative or
    /// non-finite duration.
    pub fn recognize(
        &self,
        channel: &[f32],
        sample_rate: u32,
        duration: f32,
        instruments: &[InstrumentTag],
    ) -> Result<Vec<ChordSegment>, AnalysisError> {
        let extractor = self.extractor(sample_rate)?;
        self.recognize_with(&extractor, channel, duration, instruments)
    }

    /// Chroma extractor matching this recognizer's frame size
    pub fn extractor(&self, sample_rate: u32) -> Result<ChromaExtractor, AnalysisError> {
        ChromaExtractor::new(sample_rate, self.frame_size)
    }

    /// Recognize with a prebuilt extractor, for callers analyzing many
    /// channels at one sample rate
    ///
    /// # Errors
    ///
    /// As [`ChordRecognizer::recognize`].
    pub fn recognize_with(
        &self,
        extractor: &ChromaExtractor,
        channel: &[f32],
        duration: f32,
        instruments: &[InstrumentTag],
    ) -> Result<Vec<ChordSegment>, AnalysisError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Duration must be finite and >= 0, got {}",
                duration
            )));
        }

        if self.window_seconds <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Chord window must be > 0 s, got {}",
                self.window_seconds
            )));
        }

        let instrument = instruments
            .first()
            .copied()
            .unwrap_or(self.default_instrument);

        let num_windows = (duration / self.window_seconds).ceil() as usize;
        log::debug!(
            "Recognizing chords: {:.2} s in {} windows of {:.2} s (threshold {:.2})",
            duration,
            num_windows,
            self.window_seconds,
            self.accept_threshold
        );

        let mut segments: Vec<ChordSegment> = Vec::new();

        for i in 0..num_windows {
            let start = i as f32 * self.window_seconds;
            if start >= duration {
                break;
            }
            let end = (start + self.window_seconds).min(duration);

            let chroma = extractor.extract(channel, start, end)?;
            match self.classify(&chroma) {
                Some((chord, score)) => {
                    log::trace!("{:.2}-{:.2} s: {} ({:.3})", start, end, chord, score);
                    merge_segment(&mut segments, chord, start, end, instrument);
                }
                None => log::trace!("{:.2}-{:.2} s: no chord", start, end),
            }
        }

        log::debug!("Recognized {} chord segments", segments.len());
        Ok(segments)
    }
}

/// Append a recognized window to the timeline
///
/// If the last segment carries the same label, its end is extended instead
/// of pushing a new segment. No two adjacent segments ever share a label.
pub fn merge_segment(
    segments: &mut Vec<ChordSegment>,
    chord: Chord,
    start: f32,
    end: f32,
    instrument: InstrumentTag,
) {
    if let Some(last) = segments.last_mut() {
        if last.label == chord {
            last.end = end;
            return;
        }
    }

    segments.push(ChordSegment {
        label: chord,
        start,
        end,
        instrument,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::chords::ChordTemplate;
    use std::f32::consts::PI;

    fn triad(freqs: [f32; 3], sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (seconds * sample_rate as f32) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs.iter().map(|f| (2.0 * PI * f * t).sin()).sum::<f32>() / 3.0
            })
            .collect()
    }

    fn recognizer() -> ChordRecognizer {
        ChordRecognizer::new(&EngineConfig::default())
    }

    #[test]
    fn test_c_major_template_accepted() {
        let chroma = Chromagram::from_energies(ChordTemplate::new(Chord::major(0)).weights);
        let (chord, score) = recognizer().classify(&chroma).unwrap();
        assert_eq!(chord.name(), "C");
        assert!(score > 0.3, "score {} should exceed threshold", score);
    }

    #[test]
    fn test_zero_chroma_rejected() {
        assert!(recognizer().classify(&Chromagram::zero()).is_none());
    }

    #[test]
    fn test_flat_chroma_rejected() {
        // Uniform energy scores 3 * (1/12) / sqrt(3) ~= 0.14 for every chord
        let chroma = Chromagram::from_energies([1.0; 12]);
        assert!(recognizer().classify(&chroma).is_none());
    }

    #[test]
    fn test_merge_extends_same_label() {
        let mut segments = Vec::new();
        merge_segment(&mut segments, Chord::minor(9), 0.0, 2.0, InstrumentTag::Guitar);
        merge_segment(&mut segments, Chord::minor(9), 2.0, 4.0, InstrumentTag::Guitar);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label.name(), "Am");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 4.0);
    }

    #[test]
    fn test_merge_keeps_distinct_labels() {
        let mut segments = Vec::new();
        merge_segment(&mut segments, Chord::major(0), 0.0, 2.0, InstrumentTag::Guitar);
        merge_segment(&mut segments, Chord::major(7), 2.0, 4.0, InstrumentTag::Guitar);
        merge_segment(&mut segments, Chord::major(0), 4.0, 6.0, InstrumentTag::Guitar);
        assert_eq!(segments.len(), 3);
        assert!(segments.windows(2).all(|w| w[0].label != w[1].label));
    }

    #[test]
    fn test_a_minor_triad_merges_into_one_segment() {
        let sr = 22050;
        // A3, C4, E4
        let samples = triad([220.0, 261.63, 329.63], sr, 4.0);
        let segments = recognizer()
            .recognize(&samples, sr, 4.0, &[InstrumentTag::Piano])
            .unwrap();

        assert_eq!(segments.len(), 1, "Expected one merged segment, got {:?}", segments);
        assert_eq!(segments[0].label.name(), "Am");
        assert_eq!(segments[0].start, 0.0);
        assert!((segments[0].end - 4.0).abs() < 1e-6);
        assert_eq!(segments[0].instrument, InstrumentTag::Piano);
    }

    #[test]
    fn test_chord_change_splits_segments() {
        let sr = 22050;
        // C4 E4 G4 then G3 B3 D4
        let mut samples = triad([261.63, 329.63, 392.0], sr, 2.0);
        samples.extend(triad([196.0, 246.94, 293.66], sr, 2.0));

        let segments = recognizer().recognize(&samples, sr, 4.0, &[]).unwrap();
        let names: Vec<String> = segments.iter().map(|s| s.label.name()).collect();
        assert_eq!(names, vec!["C", "G"]);
        assert_eq!(segments[0].end, segments[1].start);
        assert!(segments.iter().all(|s| s.instrument == InstrumentTag::Guitar));
    }

    #[test]
    fn test_last_window_truncated() {
        let sr = 22050;
        let samples = triad([261.63, 329.63, 392.0], sr, 3.0);
        let segments = recognizer().recognize(&samples, sr, 3.0, &[]).unwrap();
        assert_eq!(segments.len(), 1);
        assert!((segments[0].end - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_gives_no_segments() {
        let samples = vec![0.0f32; 22050 * 4];
        let segments = recognizer().recognize(&samples, 22050, 4.0, &[]).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_invalid_duration() {
        let samples = vec![0.0f32; 1000];
        assert!(recognizer().recognize(&samples, 22050, -1.0, &[]).is_err());
        assert!(recognizer().recognize(&samples, 22050, f32::NAN, &[]).is_err());
    }

    #[test]
    fn test_gap_closes_when_label_returns() {
        let sr = 22050;
        let mut samples = triad([261.63, 329.63, 392.0], sr, 2.0);
        samples.extend(vec![0.0f32; 2 * sr as usize]);
        samples.extend(triad([261.63, 329.63, 392.0], sr, 2.0));

        let segments = recognizer().recognize(&samples, sr, 6.0, &[]).unwrap();
        assert_eq!(segments.len(), 1, "Expected one bridged segment, got {:?}", segments);
        assert_eq!(segments[0].label.name(), "C");
        assert_eq!(segments[0].start, 0.0);
        assert!((segments[0].end - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_one_recognizer_reused_across_signals() {
        let sr = 22050;
        let recognizer = recognizer();
        let extractor = recognizer.extractor(sr).unwrap();
        let templates = recognizer.templates() as *const ChordTemplates;

        let c_major = triad([261.63, 329.63, 392.0], sr, 2.0);
        let a_minor = triad([220.0, 261.63, 329.63], sr, 2.0);
        let first = recognizer.recognize_with(&extractor, &c_major, 2.0, &[]).unwrap();
        let second = recognizer.recognize_with(&extractor, &a_minor, 2.0, &[]).unwrap();

        assert_eq!(first[0].label.name(), "C");
        assert_eq!(second[0].label.name(), "Am");
        assert!(std::ptr::eq(templates, recognizer.templates()));
        assert_eq!(first, recognizer.recognize(&c_major, sr, 2.0, &[]).unwrap());
    }
}
