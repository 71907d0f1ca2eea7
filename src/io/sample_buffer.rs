//! Planar multi-channel sample buffer
//!
//! The engine works on decoded PCM held per channel (planar layout). A buffer
//! has a fixed sample rate, one or two channels of equal length, and is never
//! empty; all of this is checked once at construction so downstream stages
//! can rely on it.

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::stereo_to_mono;

/// Maximum supported channel count
pub const MAX_CHANNELS: usize = 2;

/// Decoded audio: per-channel `f32` samples at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a channel count outside 1..=2, channels of
    ///   differing length, or a zero sample rate
    /// - `EmptySignal` if the channels hold no samples
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if channels.is_empty() || channels.len() > MAX_CHANNELS {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel count must be 1 or 2, got {}",
                channels.len()
            )));
        }

        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel lengths differ: {:?}",
                channels.iter().map(Vec::len).collect::<Vec<_>>()
            )));
        }

        if len == 0 {
            return Err(AnalysisError::EmptySignal(
                "Audio buffer has no samples".to_string(),
            ));
        }

        Ok(Self { channels, sample_rate })
    }

    /// Create a single-channel buffer
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a buffer from interleaved samples (`L R L R ...` for stereo)
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `channel_count` is not 1 or 2 or the sample count is
    /// not a multiple of it; otherwise as [`AudioBuffer::new`].
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        if channel_count == 0 || channel_count > MAX_CHANNELS {
            return Err(AnalysisError::InvalidInput(format!(
                "Channel count must be 1 or 2, got {}",
                channel_count
            )));
        }

        if samples.len() % channel_count != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                channel_count
            )));
        }

        let channels = (0..channel_count)
            .map(|c| samples.iter().skip(c).step_by(channel_count).copied().collect())
            .collect();

        Self::new(channels, sample_rate)
    }

    /// Interleave the channels into a single vector
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * self.channel_count());
        for i in 0..self.len() {
            out.extend(self.channels.iter().map(|c| c[i]));
        }
        out
    }

    /// Samples of channel `index`, if present
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Number of channels (1 or 2)
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Always false for a constructed buffer
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }

    /// Take ownership of the channel data
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Mono mix-down: the single channel as-is, or `(L + R) / 2`
    pub fn mixdown(&self) -> Result<Vec<f32>, AnalysisError> {
        match self.channels.as_slice() {
            [mono] => Ok(mono.clone()),
            [left, right] => stereo_to_mono(left, right),
            _ => Err(AnalysisError::InvalidInput(format!(
                "Unsupported channel count {}",
                self.channels.len()
            ))),
        }
    }
}
