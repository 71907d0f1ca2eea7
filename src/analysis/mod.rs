//! Analysis result types
//!
//! Chords, instrument tags, chord segments and the song-level summary.

pub mod result;
