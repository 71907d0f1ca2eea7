//! Frame extraction and overlap-add reconstruction
//!
//! Slices a channel into overlapping Hann-windowed frames and reassembles
//! frames into a continuous signal. Frames start at `0, hop, 2*hop, ...` up
//! to the last sample; any frame extending past the end of the input is
//! zero-padded, so no frame is ever dropped.
//!
//! # Example
//!
//! ```
//! use harmonic_dsp::spectral::FramePipeline;
//!
//! let samples = vec![0.25f32; 10_000];
//! let pipeline = FramePipeline::new(1024, 256)?;
//! let spectra = pipeline.analyze(&samples)?;
//! let frames = spectra
//!     .iter()
//!     .map(|s| s.synthesize())
//!     .collect::<Result<Vec<_>, _>>()?;
//! let restored = pipeline.overlap_add_normalized(&frames, samples.len());
//! assert!((restored[5000] - 0.25).abs() < 1e-4);
//! # Ok::<(), harmonic_dsp::AnalysisError>(())
//! ```

use rustfft::num_complex::Complex32;

use super::fft;
use super::window::hann_window;
use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-8;

/// One windowed slice of a channel
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sample offset of the first frame sample within the channel
    pub offset: usize,
    /// Windowed, zero-padded samples (`frame_size` long)
    pub samples: Vec<f32>,
}

/// Positive-frequency spectrum of one frame as parallel magnitude/phase arrays
///
/// Both arrays hold `frame_size / 2` bins; the Nyquist bin is not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin magnitudes
    pub magnitudes: Vec<f32>,
    /// Bin phases in radians
    pub phases: Vec<f32>,
}

impl Spectrum {
    /// Spectrum of an already-windowed frame
    pub fn from_frame(samples: &[f32]) -> Result<Self, AnalysisError> {
        fft::validate_size(samples.len())?;

        let mut buffer: Vec<Complex32> =
            samples.iter().map(|&x| Complex32::new(x, 0.0)).collect();
        fft::forward(&mut buffer)?;

        let half = samples.len() / 2;
        let (magnitudes, phases) = buffer[..half].iter().map(|c| (c.norm(), c.arg())).unzip();
        Ok(Self { magnitudes, phases })
    }

    /// Frame size this spectrum was computed from
    pub fn frame_size(&self) -> usize {
        self.magnitudes.len() * 2
    }

    /// Index of the bin with the largest magnitude
    pub fn peak_bin(&self) -> Option<usize> {
        self.magnitudes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &m)| match best {
                Some((_, bm)) if bm >= m => best,
                _ => Some((i, m)),
            })
            .map(|(i, _)| i)
    }

    /// Rebuild a real time-domain frame from magnitude and phase
    ///
    /// The negative-frequency half is the conjugate mirror of the positive
    /// half; the Nyquist bin is zero.
    pub fn synthesize(&self) -> Result<Vec<f32>, AnalysisError> {
        let n = self.frame_size();
        fft::validate_size(n)?;

        let mut buffer = vec![Complex32::new(0.0, 0.0); n];
        for (bin, (&mag, &phase)) in self.magnitudes.iter().zip(&self.phases).enumerate() {
            buffer[bin] = Complex32::from_polar(mag, phase);
        }
        for bin in n / 2 + 1..n {
            buffer[bin] = buffer[n - bin].conj();
        }

        fft::inverse(&mut buffer)?;
        Ok(buffer.into_iter().map(|c| c.re).collect())
    }
}

/// Windowed framing and overlap-add over one channel
#[derive(Debug, Clone)]
pub struct FramePipeline {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
}

impl FramePipeline {
    /// Create a pipeline with a Hann window of `frame_size`
    ///
    /// # Errors
    ///
    /// `InvalidSize` if `frame_size` is not a power of two, or `hop_size` is
    /// zero or larger than `frame_size`.
    pub fn new(frame_size: usize, hop_size: usize) -> Result<Self, AnalysisError> {
        fft::validate_size(frame_size)?;

        if hop_size == 0 || hop_size > frame_size {
            return Err(AnalysisError::InvalidSize(format!(
                "Hop size must be in 1..={}, got {}",
                frame_size, hop_size
            )));
        }

        Ok(Self {
            frame_size,
            hop_size,
            window: hann_window(frame_size),
        })
    }

    /// Frame length in samples
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Distance between consecutive frame starts
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// The analysis/synthesis window
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Number of frames covering `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        len.div_ceil(self.hop_size)
    }

    /// Extract windowed frame `index`, zero-padding past the end of `samples`
    pub fn frame(&self, samples: &[f32], index: usize) -> Frame {
        let offset = index * self.hop_size;
        let mut data = vec![0.0f32; self.frame_size];

        if offset < samples.len() {
            let end = (offset + self.frame_size).min(samples.len());
            for ((out, &x), &w) in data.iter_mut().zip(&samples[offset..end]).zip(&self.window) {
                *out = x * w;
            }
        }

        Frame {
            offset,
            samples: data,
        }
    }

    /// Iterate every windowed frame of `samples`
    pub fn frames<'a>(&'a self, samples: &'a [f32]) -> impl Iterator<Item = Frame> + 'a {
        (0..self.frame_count(samples.len())).map(move |i| self.frame(samples, i))
    }

    /// Spectrum of every frame, in order
    pub fn analyze(&self, samples: &[f32]) -> Result<Vec<Spectrum>, AnalysisError> {
        log::debug!(
            "Analyzing {} samples: frame={}, hop={}, frames={}",
            samples.len(),
            self.frame_size,
            self.hop_size,
            self.frame_count(samples.len())
        );

        self.frames(samples)
            .map(|frame| Spectrum::from_frame(&frame.samples))
            .collect()
    }

    /// Overlap-add synthesized frames into a buffer of `len` samples
    ///
    /// Frame `i` is multiplied by the synthesis window and accumulated at
    /// offset `i * hop`; samples past `len` are discarded.
    pub fn overlap_add(&self, frames: &[Vec<f32>], len: usize) -> Vec<f32> {
        let mut output = vec![0.0f32; len];
        self.accumulate(frames, &mut output, None);
        output
    }

    /// Overlap-add, then divide by the accumulated squared window
    ///
    /// Undoes analysis and synthesis windowing wherever the window sum is
    /// non-negligible; positions with no window coverage stay zero.
    pub fn overlap_add_normalized(&self, frames: &[Vec<f32>], len: usize) -> Vec<f32> {
        let mut output = vec![0.0f32; len];
        let mut weights = vec![0.0f32; len];
        self.accumulate(frames, &mut output, Some(&mut weights));

        for (sample, &weight) in output.iter_mut().zip(&weights) {
            *sample = if weight > EPSILON { *sample / weight } else { 0.0 };
        }
        output
    }

    fn accumulate(&self, frames: &[Vec<f32>], output: &mut [f32], mut weights: Option<&mut [f32]>) {
        let len = output.len();

        for (index, frame) in frames.iter().enumerate() {
            let offset = index * self.hop_size;
            if offset >= len {
                break;
            }
            let end = (offset + self.frame_size).min(len);

            for (i, pos) in (offset..end).enumerate() {
                let w = self.window[i];
                output[pos] += frame.get(i).copied().unwrap_or(0.0) * w;
                if let Some(weights) = weights.as_deref_mut() {
                    weights[pos] += w * w;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(matches!(FramePipeline::new(1000, 250), Err(AnalysisError::InvalidSize(_))));
        assert!(matches!(FramePipeline::new(1024, 0), Err(AnalysisError::InvalidSize(_))));
        assert!(matches!(FramePipeline::new(1024, 2048), Err(AnalysisError::InvalidSize(_))));
    }

    #[test]
    fn test_no_frame_dropped() {
        let pipeline = FramePipeline::new(1024, 512).unwrap();
        assert_eq!(pipeline.frame_count(0), 0);
        assert_eq!(pipeline.frame_count(1), 1);
        assert_eq!(pipeline.frame_count(1024), 2);
        assert_eq!(pipeline.frame_count(1025), 3);

        let samples = vec![1.0f32; 1100];
        let last = pipeline.frames(&samples).last().unwrap();
        assert_eq!(last.offset, 1024);
        assert_eq!(last.samples.len(), 1024);
        // 76 real samples, then zero padding
        assert!(last.samples[50] > 0.0);
        assert!(last.samples[76..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_frame_applies_window() {
        let pipeline = FramePipeline::new(256, 128).unwrap();
        let samples = vec![2.0f32; 512];
        let frame = pipeline.frame(&samples, 1);
        assert_eq!(frame.offset, 128);
        for (x, w) in frame.samples.iter().zip(pipeline.window()) {
            assert!((x - 2.0 * w).abs() < 1e-6);
        }
    }

    #[test]
    fn test_spectrum_peak_matches_sine_frequency() {
        let sample_rate = 44100.0;
        let frame_size = 2048;
        let freq = 2500.0;
        let pipeline = FramePipeline::new(frame_size, frame_size).unwrap();
        let samples = sine(freq, sample_rate, frame_size);

        let spectra = pipeline.analyze(&samples).unwrap();
        assert_eq!(spectra.len(), 1);
        let peak = spectra[0].peak_bin().unwrap() as i64;
        let expected = (freq / (sample_rate / frame_size as f32)).round() as i64;
        assert!((peak - expected).abs() <= 1, "peak {} expected {}", peak, expected);
    }

    #[test]
    fn test_synthesize_inverts_spectrum() {
        let frame: Vec<f32> = sine(440.0, 8000.0, 512)
            .iter()
            .zip(hann_window(512))
            .map(|(x, w)| x * w)
            .collect();

        let restored = Spectrum::from_frame(&frame).unwrap().synthesize().unwrap();
        for (a, b) in frame.iter().zip(&restored) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_overlap_add_normalized_reconstructs_interior() {
        let samples = sine(220.0, 22050.0, 8192);
        let pipeline = FramePipeline::new(1024, 256).unwrap();

        let frames: Vec<Vec<f32>> = pipeline
            .analyze(&samples)
            .unwrap()
            .iter()
            .map(|s| s.synthesize().unwrap())
            .collect();
        let restored = pipeline.overlap_add_normalized(&frames, samples.len());

        assert_eq!(restored.len(), samples.len());
        for i in 256..samples.len() - 256 {
            assert!(
                (restored[i] - samples[i]).abs() < 1e-3,
                "sample {}: {} vs {}",
                i,
                restored[i],
                samples[i]
            );
        }
    }

    #[test]
    fn test_overlap_add_accumulates_windowed_frames() {
        let pipeline = FramePipeline::new(4, 2).unwrap();
        let frames = vec![vec![1.0; 4], vec![1.0; 4]];
        let output = pipeline.overlap_add(&frames, 5);

        let w = pipeline.window();
        assert_eq!(output.len(), 5);
        assert!((output[0] - w[0]).abs() < 1e-6);
        assert!((output[2] - (w[2] + w[0])).abs() < 1e-6);
        assert!((output[3] - (w[3] + w[1])).abs() < 1e-6);
        assert!((output[4] - w[2]).abs() < 1e-6);
    }

    #[test]
    fn test_silence_gives_zero_spectra() {
        let pipeline = FramePipeline::new(512, 128).unwrap();
        let spectra = pipeline.analyze(&vec![0.0; 2000]).unwrap();
        assert!(spectra.iter().all(|s| s.magnitudes.iter().all(|&m| m == 0.0)));
    }
}
