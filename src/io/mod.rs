//! Audio buffer types
//!
//! Decoding is left to the caller; the engine starts from planar PCM.

pub mod sample_buffer;

pub use sample_buffer::AudioBuffer;
