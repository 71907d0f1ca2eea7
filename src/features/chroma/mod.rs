//! Chroma extraction modules
//!
//! Fold spectral energy into a 12-bin pitch-class distribution:
//! - Chromagram computation over a time span
//! - Normalization strategies

pub mod extractor;
pub mod normalization;

pub use extractor::{extract_chromagram, frequency_to_pitch_class, ChromaExtractor, Chromagram};

/// Number of pitch classes (C = 0 ... B = 11)
pub const PITCH_CLASSES: usize = 12;

/// Note names indexed by pitch class
pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
