//! Configuration parameters for analysis and separation
//!
//! All thresholds here are heuristic configuration constants, not learned
//! values. They are built once and passed by reference into each component.

use serde::{Deserialize, Serialize};

use crate::analysis::result::InstrumentTag;
use crate::error::AnalysisError;

/// Engine configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Analysis
    /// FFT frame size for chroma extraction (default: 4096)
    pub analysis_frame_size: usize,

    /// Length of one chord-recognition window in seconds (default: 2.0)
    pub chord_window_seconds: f32,

    /// Minimum template score for a chord to be accepted (default: 0.3)
    pub chord_accept_threshold: f32,

    /// Per-family instrument detection cutoffs
    pub instrument_thresholds: InstrumentThresholds,

    /// Tag asserted when no instrument family is detected (default: Guitar)
    pub default_instrument: InstrumentTag,

    // Separation
    /// Spectral separator parameters
    pub separator: SeparatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis_frame_size: 4096,
            chord_window_seconds: 2.0,
            chord_accept_threshold: 0.3,
            instrument_thresholds: InstrumentThresholds::default(),
            default_instrument: InstrumentTag::Guitar,
            separator: SeparatorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate sizes and ranges
    ///
    /// # Errors
    ///
    /// `InvalidSize` for frame/hop sizes that cannot drive the transform,
    /// `InvalidInput` for non-finite or out-of-range values.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        require_power_of_two("analysis_frame_size", self.analysis_frame_size)?;

        if !self.chord_window_seconds.is_finite() || self.chord_window_seconds <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "chord_window_seconds must be > 0, got {}",
                self.chord_window_seconds
            )));
        }

        if !self.chord_accept_threshold.is_finite() {
            return Err(AnalysisError::InvalidInput(
                "chord_accept_threshold must be finite".to_string(),
            ));
        }

        self.instrument_thresholds.validate()?;
        self.separator.validate()
    }
}

/// Heuristic cutoffs for the instrument-family detectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentThresholds {
    /// Non-overlapping analysis window size in samples (default: 2048)
    pub window_size: usize,

    /// Sample-to-sample delta that marks a window as transient (default: 0.1)
    pub transient_delta: f32,

    /// Number of samples at the start of each window measured for attack (default: 100)
    pub attack_samples: usize,

    /// Mean absolute level over the attack span that counts as a sharp attack (default: 0.2)
    pub attack_level: f32,

    /// Plucked family: minimum fraction of transient windows (default: 0.1)
    pub plucked_transient_rate: f32,

    /// Plucked family: minimum average energy in `plucked_band_hz` (default: 0.05)
    pub plucked_band_energy: f32,

    /// Plucked family band in Hz (default: 80-1000)
    pub plucked_band_hz: (f32, f32),

    /// Sustained family: minimum fraction of sharp-attack windows (default: 0.05)
    pub sustained_attack_rate: f32,

    /// Sustained family: minimum fraction of wide-range windows (default: 0.03)
    pub sustained_wide_range_rate: f32,

    /// Low / mid / high bands in Hz (default: 100-500, 500-2000, 2000-4000)
    pub wide_range_bands_hz: [(f32, f32); 3],

    /// Minimum per-window energy in each of the low / mid / high bands
    /// (default: 0.01, 0.01, 0.005)
    pub wide_range_minimums: [f32; 3],
}

impl Default for InstrumentThresholds {
    fn default() -> Self {
        Self {
            window_size: 2048,
            transient_delta: 0.1,
            attack_samples: 100,
            attack_level: 0.2,
            plucked_transient_rate: 0.1,
            plucked_band_energy: 0.05,
            plucked_band_hz: (80.0, 1000.0),
            sustained_attack_rate: 0.05,
            sustained_wide_range_rate: 0.03,
            wide_range_bands_hz: [(100.0, 500.0), (500.0, 2000.0), (2000.0, 4000.0)],
            wide_range_minimums: [0.01, 0.01, 0.005],
        }
    }
}

impl InstrumentThresholds {
    fn validate(&self) -> Result<(), AnalysisError> {
        require_power_of_two("instrument window_size", self.window_size)?;

        if self.attack_samples == 0 || self.attack_samples > self.window_size {
            return Err(AnalysisError::InvalidInput(format!(
                "attack_samples must be in 1..={}, got {}",
                self.window_size, self.attack_samples
            )));
        }

        let bands = std::iter::once(self.plucked_band_hz).chain(self.wide_range_bands_hz);
        for (low, high) in bands {
            if !(low.is_finite() && high.is_finite()) || low < 0.0 || high <= low {
                return Err(AnalysisError::InvalidInput(format!(
                    "Invalid instrument band: {}-{} Hz",
                    low, high
                )));
            }
        }

        Ok(())
    }
}

/// Spectral separator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// FFT frame size (default: 8192, must be >= 4096)
    pub frame_size: usize,

    /// Explicit hop size; when absent the hop follows the frame size as
    /// `frame_size / 4` (see [`SeparatorConfig::hop_size`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hop_size: Option<usize>,

    /// Band edges in Hz: vocal fundamental starts at `[0]`, primary vocal
    /// range at `[1]`, vocal harmonics at `[2]`, and everything above `[3]`
    /// is outside the vocal bands (default: 80, 300, 3500, 8000)
    pub band_bounds_hz: [f32; 4],

    /// Attenuation in the vocal fundamental band (default: 0.6)
    pub fundamental_attenuation: f32,

    /// Primary vocal band attenuation for sustained content (default: 0.15)
    pub primary_min_attenuation: f32,

    /// Primary vocal band attenuation for fully transient content (default: 0.5)
    pub primary_max_attenuation: f32,

    /// Multiplier on spectral flux before saturating at 1 (default: 2.0)
    pub flux_gain: f32,

    /// Attenuation in the vocal harmonics band (default: 0.5)
    pub harmonics_attenuation: f32,

    /// Attenuation outside the vocal bands (default: 0.85)
    pub outside_attenuation: f32,

    /// Exponential smoothing coefficient applied across frames (default: 0.7)
    pub temporal_smoothing: f32,

    /// RMS the output is driven towards (default: 0.15)
    pub target_rms: f32,

    /// Pre-saturation drive of the soft clipper (default: 0.9)
    pub soft_clip_drive: f32,

    /// Post-saturation ceiling of the soft clipper (default: 1.1)
    pub soft_clip_ceiling: f32,

    /// Side-signal scale for stereo output (default: 1.2)
    pub stereo_width_factor: f32,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            frame_size: 8192,
            hop_size: None,
            band_bounds_hz: [80.0, 300.0, 3500.0, 8000.0],
            fundamental_attenuation: 0.6,
            primary_min_attenuation: 0.15,
            primary_max_attenuation: 0.5,
            flux_gain: 2.0,
            harmonics_attenuation: 0.5,
            outside_attenuation: 0.85,
            temporal_smoothing: 0.7,
            target_rms: 0.15,
            soft_clip_drive: 0.9,
            soft_clip_ceiling: 1.1,
            stereo_width_factor: 1.2,
        }
    }
}

/// Smallest frame size the separator accepts
pub const MIN_SEPARATOR_FRAME_SIZE: usize = 4096;

impl SeparatorConfig {
    /// Effective hop size: the explicit value, or `frame_size / 4`
    pub fn hop_size(&self) -> usize {
        self.hop_size.unwrap_or(self.frame_size / 4)
    }

    /// Validate sizes and ranges
    pub fn validate(&self) -> Result<(), AnalysisError> {
        require_power_of_two("separator frame_size", self.frame_size)?;

        if self.frame_size < MIN_SEPARATOR_FRAME_SIZE {
            return Err(AnalysisError::InvalidSize(format!(
                "Separator frame size must be >= {}, got {}",
                MIN_SEPARATOR_FRAME_SIZE, self.frame_size
            )));
        }

        let hop_size = self.hop_size();
        if hop_size == 0 || hop_size > self.frame_size {
            return Err(AnalysisError::InvalidSize(format!(
                "Hop size must be in 1..={}, got {}",
                self.frame_size, hop_size
            )));
        }

        if !self.band_bounds_hz.windows(2).all(|w| w[0] < w[1]) || self.band_bounds_hz[0] < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Band bounds must be ascending and non-negative: {:?}",
                self.band_bounds_hz
            )));
        }

        if !(0.0..=1.0).contains(&self.temporal_smoothing) {
            return Err(AnalysisError::InvalidInput(format!(
                "temporal_smoothing must be in [0, 1], got {}",
                self.temporal_smoothing
            )));
        }

        let values = [
            self.fundamental_attenuation,
            self.primary_min_attenuation,
            self.primary_max_attenuation,
            self.flux_gain,
            self.harmonics_attenuation,
            self.outside_attenuation,
            self.target_rms,
            self.soft_clip_drive,
            self.soft_clip_ceiling,
            self.stereo_width_factor,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AnalysisError::InvalidInput(
                "Separator gains must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_power_of_two(name: &str, value: usize) -> Result<(), AnalysisError> {
    if value == 0 || !value.is_power_of_two() {
        return Err(AnalysisError::InvalidSize(format!(
            "{} must be a power of two, got {}",
            name, value
        )));
    }
    Ok(())
}
