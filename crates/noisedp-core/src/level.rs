//! Decibel arithmetic.
//!
//! Sound levels add in the power domain, not the decibel domain. These
//! helpers convert between the two and implement the energy average and
//! energy sum used by the Leq and LE aggregation rules.
//!
//! # Conversions
//!
//! - [`db_to_power`] / [`power_to_db`] - `10^(x/10)` and `10·log10(p)`
//!
//! # Aggregates
//!
//! - [`log_mean`] - Energy average (Leq)
//! - [`log_sum`] - Energy sum (LE, octave folding)

/// Convert a level in decibels to relative linear power.
///
/// # Example
/// ```rust
/// use noisedp_core::db_to_power;
///
/// assert!((db_to_power(10.0) - 10.0).abs() < 1e-12);
/// assert!((db_to_power(0.0) - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub fn db_to_power(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Convert relative linear power to decibels.
///
/// Non-positive power maps to negative infinity.
#[inline]
pub fn power_to_db(power: f64) -> f64 {
    10.0 * power.log10()
}

/// Energy average `10·log10(mean(10^(x/10)))`. `None` for an empty slice.
///
/// # Example
/// ```rust
/// use noisedp_core::log_mean;
///
/// let leq = log_mean(&[50.0, 52.0, 54.0, 56.0]).unwrap();
/// assert!((leq - 53.56).abs() < 0.01);
/// ```
pub fn log_mean(levels: &[f64]) -> Option<f64> {
    if levels.is_empty() {
        return None;
    }
    let total: f64 = levels.iter().map(|&x| db_to_power(x)).sum();
    Some(power_to_db(total / levels.len() as f64))
}

/// Energy sum `10·log10(Σ 10^(x/10))`. `None` for an empty slice.
pub fn log_sum(levels: &[f64]) -> Option<f64> {
    if levels.is_empty() {
        return None;
    }
    Some(power_to_db(levels.iter().map(|&x| db_to_power(x)).sum()))
}

/// Round to the nearest integer, exact halves to the even neighbour.
#[inline]
pub fn round_half_even(x: f64) -> f64 {
    x.round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_roundtrip() {
        for db in [-20.0, 0.0, 35.5, 94.0, 120.0] {
            assert!((power_to_db(db_to_power(db)) - db).abs() < 1e-9);
        }
    }

    #[test]
    fn equal_levels_sum_to_plus_three() {
        let sum = log_sum(&[60.0, 60.0]).unwrap();
        assert!((sum - 63.0103).abs() < 1e-3);
    }

    #[test]
    fn log_mean_of_constant_is_constant() {
        assert!((log_mean(&[45.0; 7]).unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn empty_aggregates_are_none() {
        assert_eq!(log_mean(&[]), None);
        assert_eq!(log_sum(&[]), None);
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round_half_even(64.5), 64.0);
        assert_eq!(round_half_even(65.5), 66.0);
        assert_eq!(round_half_even(64.51), 65.0);
    }
}
