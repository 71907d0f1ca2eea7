//! # Harmonic DSP
//!
//! A harmonic-content analysis engine for decoded audio: chord timelines,
//! coarse instrument classification, and a vocal-attenuated "instrumental"
//! resynthesis.
//!
//! ## Features
//!
//! - **Spectral transform**: radix-2 FFT, Hann framing, overlap-add reconstruction
//! - **Chromagram**: 12-bin pitch-class energy over any time span
//! - **Chord recognition**: 24 major/minor triad templates with merged segments
//! - **Instrument classification**: plucked vs sustained heuristics
//! - **Spectral separation**: band- and flux-driven vocal attenuation with
//!   phase-preserving resynthesis, soft normalization and stereo widening
//! - **Tempo**: a simple amplitude-envelope BPM estimate
//!
//! ## Quick Start
//!
//! ```no_run
//! use harmonic_dsp::{analyze_song, AudioBuffer, EngineConfig};
//!
//! // Decoded planar audio (mono or stereo, f32)
//! let left: Vec<f32> = vec![0.0; 44100 * 10];
//! let right = left.clone();
//! let buffer = AudioBuffer::new(vec![left, right], 44100)?;
//!
//! let output = analyze_song(&buffer, &EngineConfig::default())?;
//!
//! println!("Tempo: {} BPM", output.analysis.tempo_bpm);
//! for segment in &output.analysis.chords {
//!     println!("{:>6.2}-{:>6.2} s  {}", segment.start, segment.end, segment.label);
//! }
//! # Ok::<(), harmonic_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AudioBuffer → Spectral Separator → instrumental AudioBuffer
//!                                        │ (mono mix-down)
//!                      ┌─────────────────┼─────────────────┐
//!                      ▼                 ▼                 ▼
//!           Instrument Classifier  Chord Recognizer   Tempo estimate
//!                      └──── tags ──────►│
//!                                        ▼
//!                                  SongAnalysis
//! ```
//!
//! Every stage is a pure function of its input and an [`EngineConfig`]; no
//! state survives between calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod separation;
pub mod spectral;

// Re-export main types
pub use analysis::result::{Chord, ChordQuality, ChordSegment, InstrumentTag, SongAnalysis};
pub use config::{EngineConfig, InstrumentThresholds, SeparatorConfig};
pub use error::AnalysisError;
pub use features::chords::ChordRecognizer;
pub use features::chroma::{extract_chromagram, ChromaExtractor, Chromagram};
pub use features::instruments::classify_instruments;
pub use features::tempo::estimate_tempo;
pub use io::AudioBuffer;
pub use separation::separate;

/// Result of [`analyze_song`]
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Serializable analysis summary
    pub analysis: SongAnalysis,
    /// Vocal-attenuated buffer, same shape as the input
    pub instrumental: AudioBuffer,
}

/// Reusable analysis pipeline
///
/// Validates the configuration and builds the chord templates once; every
/// [`SongAnalyzer::analyze`] call reuses them. Prefer this over
/// [`analyze_song`] when analyzing more than one buffer.
///
/// # Example
///
/// ```
/// use harmonic_dsp::{AudioBuffer, EngineConfig, SongAnalyzer};
///
/// let analyzer = SongAnalyzer::new(&EngineConfig::default())?;
/// for seconds in [1, 2] {
///     let buffer = AudioBuffer::mono(vec![0.0f32; 44100 * seconds], 44100)?;
///     let output = analyzer.analyze(&buffer)?;
///     assert_eq!(output.instrumental.len(), buffer.len());
/// }
/// # Ok::<(), harmonic_dsp::AnalysisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SongAnalyzer {
    config: EngineConfig,
    recognizer: ChordRecognizer,
}

impl SongAnalyzer {
    /// Validate `config` and build the chord recognizer
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if `config` fails validation.
    pub fn new(config: &EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            recognizer: ChordRecognizer::new(config),
        })
    }

    /// Configuration this analyzer was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Chord recognizer shared by every analysis
    pub fn recognizer(&self) -> &ChordRecognizer {
        &self.recognizer
    }

    /// Run the full analysis pipeline on a decoded buffer
    ///
    /// Separates the instrumental first, then classifies instruments,
    /// recognizes chords and estimates tempo on its mono mix-down. Chord
    /// segments carry the first detected instrument tag.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Decoded mono or stereo audio
    ///
    /// # Returns
    ///
    /// [`AnalysisOutput`] holding the [`SongAnalysis`] and the instrumental buffer
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if any stage rejects its input. Nothing is
    /// returned on error.
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<AnalysisOutput, AnalysisError> {
        use std::time::Instant;
        let start_time = Instant::now();

        let config = &self.config;
        let sample_rate = buffer.sample_rate();
        let duration = buffer.duration_seconds();

        log::debug!(
            "Starting song analysis: {} channel(s), {} samples at {} Hz ({:.2} s)",
            buffer.channel_count(),
            buffer.len(),
            sample_rate,
            duration
        );

        // 1. Vocal attenuation
        let instrumental = separate(buffer, &config.separator)?;
        let mono = instrumental.mixdown()?;

        // 2. Instrument families
        let instruments = classify_instruments(
            &mono,
            sample_rate,
            &config.instrument_thresholds,
            config.default_instrument,
        )?;
        log::debug!("Detected instruments: {:?}", instruments);

        // 3. Chord timeline
        let chords = self
            .recognizer
            .recognize(&mono, sample_rate, duration, &instruments)?;

        // 4. Tempo
        let tempo_bpm = estimate_tempo(&mono, sample_rate)?;

        let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
        log::debug!(
            "Song analysis complete: {} chord segments, {} BPM, {:.1} ms",
            chords.len(),
            tempo_bpm,
            processing_time_ms
        );

        Ok(AnalysisOutput {
            analysis: SongAnalysis {
                duration_seconds: duration,
                sample_rate,
                channels: buffer.channel_count(),
                tempo_bpm,
                instruments,
                chords,
                processing_time_ms,
            },
            instrumental,
        })
    }
}

/// Analyze a single buffer
///
/// One-shot form of [`SongAnalyzer`]: builds the analyzer, runs it once and
/// drops it.
///
/// # Arguments
///
/// * `buffer` - Decoded mono or stereo audio
/// * `config` - Engine configuration
///
/// # Errors
///
/// Returns `AnalysisError` if `config` fails validation or any stage rejects
/// its input. Nothing is returned on error.
///
/// # Example
///
/// ```
/// use harmonic_dsp::{analyze_song, AudioBuffer, EngineConfig};
///
/// let buffer = AudioBuffer::mono(vec![0.0f32; 44100], 44100)?;
/// let output = analyze_song(&buffer, &EngineConfig::default())?;
///
/// assert!(output.analysis.chords.is_empty());
/// assert!(!output.analysis.instruments.is_empty());
/// assert_eq!(output.instrumental.len(), buffer.len());
/// # Ok::<(), harmonic_dsp::AnalysisError>(())
/// ```
pub fn analyze_song(buffer: &AudioBuffer, config: &EngineConfig) -> Result<AnalysisOutput, AnalysisError> {
    SongAnalyzer::new(config)?.analyze(buffer)
}
