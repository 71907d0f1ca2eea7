//! Feature extraction modules
//!
//! This module contains the analysis algorithms:
//! - Chroma extraction
//! - Chord recognition (template matching + segment merging)
//! - Instrument-family classification
//! - Tempo estimation

pub mod chords;
pub mod chroma;
pub mod instruments;
pub mod tempo;
