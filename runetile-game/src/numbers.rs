//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Map a unit fraction onto an index in `0..len`, clamping out-of-range draws.
///
/// Returns 0 for empty ranges and for non-finite or negative fractions.
#[must_use]
pub fn fraction_to_index(fraction: f64, len: usize) -> usize {
    if len == 0 || !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    let len_f = cast::<usize, f64>(len).unwrap_or(f64::MAX);
    let scaled = (fraction * len_f).floor();
    cast::<f64, usize>(scaled).unwrap_or(0).min(len - 1)
}

/// Draw an inclusive integer from `[min, max]` using a unit fraction.
#[must_use]
pub fn fraction_in_range(fraction: f64, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = usize::try_from(u64::from(hi - lo) + 1).unwrap_or(usize::MAX);
    let offset = fraction_to_index(fraction, span);
    lo.saturating_add(u32::try_from(offset).unwrap_or(0))
}

/// Ratio as a percentage, returning 0.0 when the denominator is zero.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let part = cast::<usize, f64>(part).unwrap_or(0.0);
    let whole = cast::<usize, f64>(whole).unwrap_or(f64::MAX);
    part / whole * 100.0
}

/// Format an amount with comma thousands separators.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_clamps_edges() {
        assert_eq!(fraction_to_index(0.0, 4), 0);
        assert_eq!(fraction_to_index(0.999, 4), 3);
        assert_eq!(fraction_to_index(1.0, 4), 3);
        assert_eq!(fraction_to_index(f64::NAN, 4), 0);
        assert_eq!(fraction_to_index(0.5, 0), 0);
    }

    #[test]
    fn range_draws_stay_inclusive() {
        assert_eq!(fraction_in_range(0.0, 10, 25), 10);
        assert_eq!(fraction_in_range(0.9999, 10, 25), 25);
        assert_eq!(fraction_in_range(0.5, 1, 1), 1);
        assert_eq!(fraction_in_range(0.0, 5, 3), 3);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_500), "1,500");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn percentage_handles_zero() {
        assert!((percentage(1, 0) - 0.0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
