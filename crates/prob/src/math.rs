//! Small numerical helpers shared by the engines.
//!
//! All functions are pure and allocation-light.

/// Scale `weights` in place so they sum to 1 and return the sum before scaling.
///
/// An all-zero (or empty) slice is left unchanged and `0.0` is returned, so
/// callers can tell a degenerate result apart from a normalized one.
pub fn normalize(weights: &mut [f64]) -> f64 {
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return sum;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }
    sum
}

/// Every combination taking one element from each list, in odometer order
/// (last list varies fastest).
///
/// The product of zero lists is a single empty combination.
///
/// ```rust
/// use probgraph_prob::math::cartesian_product;
///
/// let combos = cartesian_product(&[vec!["T", "F"], vec!["x"]]);
/// assert_eq!(combos, vec![vec!["T", "x"], vec!["F", "x"]]);
/// ```
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut combo = prefix.clone();
                    combo.push(item.clone());
                    combo
                })
            })
            .collect()
    })
}

/// Row vector times square matrix: `result[j] = Σᵢ vector[i] · matrix[i][j]`.
pub fn vec_mat_mul(vector: &[f64], matrix: &[Vec<f64>]) -> Vec<f64> {
    let mut result = vec![0.0; vector.len()];
    for (j, out) in result.iter_mut().enumerate() {
        for (i, &v) in vector.iter().enumerate() {
            *out += v * matrix[i][j];
        }
    }
    result
}

/// Largest component-wise absolute difference.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Whether every component differs by at most `tolerance`.
pub fn converged(a: &[f64], b: &[f64], tolerance: f64) -> bool {
    max_abs_diff(a, b) <= tolerance
}

/// Stable `ln(Σ exp(values))`; `-inf` for an empty slice or all `-inf`.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Index of the largest value. `None` when empty or when nothing beats
/// `-inf` (ties keep the first index).
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let beats = match best {
            Some((_, b)) => v > b,
            None => v > f64::NEG_INFINITY,
        };
        if beats {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
