//! Numeric utilities: centralized integer conversions.
//!
//! Prefer saturating conversions when clamping is safer than panicking or truncating
//! (e.g., converting a time span to u64 for metrics/logging).

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u128_to_u64_saturating(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

/// Lower edge of the decade containing `year` (`1999 -> 1990`, `-5 -> -10`).
///
/// The decade of the lowest years starts below `i64::MIN`; it saturates there.
#[inline]
#[must_use]
pub const fn decade_of(year: i64) -> i64 {
    year.div_euclid(10).saturating_mul(10)
}
