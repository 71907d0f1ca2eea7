//! Chord recognition modules
//!
//! Label time windows with major/minor triads:
//! - Unit-length chord templates (24 chords)
//! - Template matching and segment merging

pub mod recognizer;
pub mod templates;

pub use recognizer::{merge_segment, ChordRecognizer};
pub use templates::{ChordTemplate, ChordTemplates};
