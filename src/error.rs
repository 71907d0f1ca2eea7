//! Error types for the analysis engine

use thiserror::Error;

/// Errors that can occur during analysis or separation
///
/// Numerically degenerate input (silent windows, zero RMS) is never an error;
/// only invalid shapes and parameters are.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Transform or frame size is not a power of two, hop is invalid, or the
    /// transform input is empty
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// Zero-length sample buffer or channel
    #[error("Empty signal: {0}")]
    EmptySignal(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
