//! Linear statistics over level samples.
//!
//! All functions take the non-null samples of one bin and return `None` when
//! the slice is empty.

use crate::level::round_half_even;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (mean of the two central values for even counts).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q` in `[0, 1]` with linear interpolation between order
/// statistics.
///
/// # Example
/// ```rust
/// use noisedp_core::quantile;
///
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.25), Some(2.0));
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), Some(1.75));
/// ```
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Lowest modal value after rounding each sample to a whole number
/// (half to even).
///
/// When several rounded values share the highest count the smallest one
/// wins.
///
/// # Example
/// ```rust
/// use noisedp_core::lowest_mode;
///
/// // 41.6 and 42.4 both round to 42, 44.5 rounds to 44
/// assert_eq!(lowest_mode(&[41.6, 42.4, 44.5, 44.2]), Some(42.0));
/// ```
pub fn lowest_mode(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut rounded: Vec<f64> = values.iter().map(|&v| round_half_even(v)).collect();
    rounded.sort_by(f64::total_cmp);

    let mut best = rounded[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < rounded.len() {
        let v = rounded[i];
        let run = rounded[i..].iter().take_while(|&&x| x == v).count();
        // Ascending scan: strict > keeps the smallest of tied modes
        if run > best_count {
            best = v;
            best_count = run;
        }
        i += run;
    }
    Some(best)
}

/// Maximum after discarding the `k` highest samples.
///
/// Returns the `(k+1)`-th largest value, or the minimum when the slice has
/// `k` or fewer samples.
///
/// # Example
/// ```rust
/// use noisedp_core::trimmed_max;
///
/// assert_eq!(trimmed_max(&[60.0, 65.0, 70.0, 55.0], 1), Some(65.0));
/// assert_eq!(trimmed_max(&[60.0, 65.0], 5), Some(60.0));
/// ```
pub fn trimmed_max(values: &[f64], k: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    Some(sorted.get(k).copied().unwrap_or(sorted[sorted.len() - 1]))
}
