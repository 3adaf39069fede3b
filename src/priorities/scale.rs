//! Rank-normalization helpers shared by priorities whose reduction step
//! spreads raw scores across `[0, target]`.

/// Higher input scores to a higher output: `round(target * (x - min) / (max - min))`.
/// Returns an all-zero vector when the span is zero.
pub fn scale(xs: &[i64], target: i64) -> Vec<i64> {
    let min = *xs.iter().min().unwrap_or(&0);
    let max = *xs.iter().max().unwrap_or(&0);
    if max == min {
        return vec![0; xs.len()];
    }
    xs.iter()
        .map(|&x| {
            (target as f64 * (x - min) as f64 / (max - min) as f64).round() as i64
        })
        .collect()
}

/// Lower input scores to a higher output: `round(target * (x - max) / (min - max))`.
/// Returns an all-zero vector when the span is zero.
pub fn scale_inverse(xs: &[i64], target: i64) -> Vec<i64> {
    let min = *xs.iter().min().unwrap_or(&0);
    let max = *xs.iter().max().unwrap_or(&0);
    if max == min {
        return vec![0; xs.len()];
    }
    xs.iter()
        .map(|&x| {
            (target as f64 * (x - max) as f64 / (min - max) as f64).round() as i64
        })
        .collect()
}
