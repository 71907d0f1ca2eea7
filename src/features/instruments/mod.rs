//! Instrument-family classification modules
//!
//! Heuristic detectors over non-overlapping analysis windows:
//! - Transient/attack statistics from the waveform
//! - Banded spectral energy
//! - Family predicates over whole-signal averages

pub mod bands;
pub mod classifier;
pub mod transient;

pub use classifier::{classify_instruments, InstrumentEvidence};
