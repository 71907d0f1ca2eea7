//! Chroma normalization strategies

/// Scale a vector so its entries sum to 1
///
/// Returns `false` and leaves the vector untouched when the sum is not
/// positive (a silent span stays the zero vector).
pub fn normalize_sum(values: &mut [f32]) -> bool {
    let sum: f32 = values.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return false;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
    true
}

/// Scale a vector to unit Euclidean length
///
/// Returns `false` and leaves the vector untouched when its norm is zero.
pub fn normalize_l2(values: &mut [f32]) -> bool {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return false;
    }
    for v in values.iter_mut() {
        *v /= norm;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sum() {
        let mut v = [1.0, 3.0, 0.0, 4.0];
        assert!(normalize_sum(&mut v));
        assert_eq!(v, [0.125, 0.375, 0.0, 0.5]);
    }

    #[test]
    fn test_normalize_sum_zero_vector_untouched() {
        let mut v = [0.0f32; 12];
        assert!(!normalize_sum(&mut v));
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_normalize_l2() {
        let mut v = [3.0, 4.0];
        assert!(normalize_l2(&mut v));
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!(!normalize_l2(&mut [0.0, 0.0]));
    }
}
