//! Transient and attack statistics
//!
//! Per window: the largest sample-to-sample jump, and the mean absolute level
//! over the first few samples (the attack span).

/// Transient statistics of one analysis window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowTransients {
    /// Largest `|x[n+1] - x[n]|` within the window
    pub max_delta: f32,
    /// Mean absolute level over the attack span
    pub attack_level: f32,
}

/// Compute transient statistics for one window
///
/// `attack_samples` is clamped to the window length.
pub fn window_transients(window: &[f32], attack_samples: usize) -> WindowTransients {
    let max_delta = window
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .fold(0.0f32, f32::max);

    let attack_len = attack_samples.min(window.len());
    let attack_level = if attack_len == 0 {
        0.0
    } else {
        window[..attack_len].iter().map(|x| x.abs()).sum::<f32>() / attack_len as f32
    };

    WindowTransients {
        max_delta,
        attack_level,
    }
}
