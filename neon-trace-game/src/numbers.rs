//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{INTEGRITY_MAX, INTEGRITY_MIN};

/// Round a finite f64 into the integrity range, returning `None` for NaN or infinities.
#[must_use]
pub fn integrity_from_f64(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let clamped = value
        .round()
        .clamp(f64::from(INTEGRITY_MIN), f64::from(INTEGRITY_MAX));
    cast::<f64, u8>(clamped)
}

/// Apply a signed delta to an integrity value, saturating into range.
#[must_use]
pub fn apply_integrity_delta(current: u8, delta: i32) -> u8 {
    let next = i32::from(current)
        .saturating_add(delta)
        .clamp(i32::from(INTEGRITY_MIN), i32::from(INTEGRITY_MAX));
    cast::<i32, u8>(next).unwrap_or(INTEGRITY_MIN)
}

/// Convert a JSON-sized unsigned index into `usize`, returning `None` if it does not fit.
#[must_use]
pub fn u64_to_usize(value: u64) -> Option<usize> {
    cast::<u64, usize>(value)
}

/// Accept any finite, integral, non-negative float as an index, saturating at `usize::MAX`.
#[must_use]
pub fn saturating_index(value: f64) -> Option<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    Some(cast::<f64, usize>(value).unwrap_or(usize::MAX))
}

/// Ratio of two counts as f64, zero when the denominator is zero.
#[must_use]
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let num = cast::<usize, f64>(numerator).unwrap_or(0.0);
    let den = cast::<usize, f64>(denominator).unwrap_or(1.0);
    (num / den).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_rounds_and_clamps() {
        assert_eq!(integrity_from_f64(57.4), Some(57));
        assert_eq!(integrity_from_f64(57.5), Some(58));
        assert_eq!(integrity_from_f64(-3.0), Some(0));
        assert_eq!(integrity_from_f64(250.0), Some(100));
        assert_eq!(integrity_from_f64(f64::NAN), None);
        assert_eq!(integrity_from_f64(f64::INFINITY), None);
    }

    #[test]
    fn delta_saturates() {
        assert_eq!(apply_integrity_delta(3, -5), 0);
        assert_eq!(apply_integrity_delta(98, 5), 100);
        assert_eq!(apply_integrity_delta(50, i32::MIN), 0);
        assert_eq!(apply_integrity_delta(50, -20), 30);
    }

    #[test]
    fn huge_indices_saturate() {
        assert_eq!(saturating_index(3.0), Some(3));
        assert_eq!(saturating_index(1e20), Some(usize::MAX));
        assert_eq!(saturating_index(-0.0), Some(0));
        assert_eq!(saturating_index(2.5), None);
        assert_eq!(saturating_index(-4.0), None);
        assert_eq!(saturating_index(f64::INFINITY), None);
    }

    #[test]
    fn ratio_handles_empty_denominator() {
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
        assert!(ratio(3, 0).abs() < f64::EPSILON);
        assert!((ratio(5, 4) - 1.0).abs() < f64::EPSILON);
    }
}
