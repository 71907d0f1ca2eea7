//! Channel mixing utilities (stereo to mono, mid/side width)

use crate::error::AnalysisError;

/// Convert stereo to mono by averaging: `(L + R) / 2`
///
/// # Errors
///
/// `InvalidInput` if the channels differ in length.
pub fn stereo_to_mono(left: &[f32], right: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    if left.len() != right.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "Channel lengths differ: {} vs {}",
            left.len(),
            right.len()
        )));
    }

    Ok(left.iter().zip(right).map(|(l, r)| (l + r) * 0.5).collect())
}

/// Scale the side signal of a stereo pair in place
///
/// Decomposes into `mid = (L+R)/2`, `side = (L-R)/2`, then recomposes
/// `L = mid + side*width`, `R = mid - side*width`. A width of 1 leaves the
/// pair unchanged; widths above 1 widen the image.
pub fn widen_stereo(left: &mut [f32], right: &mut [f32], width: f32) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) * 0.5;
        let side = (*l - *r) * 0.5;
        *l = mid + side * width;
        *r = mid - side * width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_to_mono_averages() {
        let mono = stereo_to_mono(&[1.0, 0.5, -1.0], &[0.0, 0.5, 1.0]).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_stereo_to_mono_length_mismatch() {
        assert!(stereo_to_mono(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_unit_width_is_lossless() {
        let left_in: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin()).collect();
        let right_in: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.023).cos() * 0.7).collect();
        let (mut left, mut right) = (left_in.clone(), right_in.clone());

        widen_stereo(&mut left, &mut right, 1.0);

        for i in 0..1000 {
            assert!((left[i] - left_in[i]).abs() < 1e-6);
            assert!((right[i] - right_in[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_width_scales_side_only() {
        let (mut left, mut right) = (vec![1.0f32, 0.3], vec![0.0f32, 0.3]);
        widen_stereo(&mut left, &mut right, 1.2);

        // Mid preserved
        assert!(((left[0] + right[0]) * 0.5 - 0.5).abs() < 1e-6);
        // Side 0.5 -> 0.6
        assert!(((left[0] - right[0]) * 0.5 - 0.6).abs() < 1e-6);
        // Centered content untouched
        assert!((left[1] - 0.3).abs() < 1e-6 && (right[1] - 0.3).abs() < 1e-6);
    }
}
