//! Half-open chainage intervals measured in kilometres.
//!
//! Every interval invariant in the registry reduces to three predicates on
//! [`ChainageRange`]: [`ChainageRange::overlaps`], [`ChainageRange::contains`]
//! and [`ChainageRange::is_valid`]. Ranges are `[start, end)`, so two ranges
//! that merely touch at an endpoint do not overlap.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decimal places used when presenting kilometre values.
pub const DISPLAY_PRECISION: i32 = 3;

/// Round a kilometre value to [`DISPLAY_PRECISION`] decimal places.
///
/// Rounding is presentation only; comparisons always use raw values.
///
/// # Examples
/// ```
/// use corridor::domain::chainage::round_km;
///
/// assert_eq!(round_km(12.34567), 12.346);
/// assert_eq!(round_km(45.0), 45.0);
/// ```
#[must_use]
pub fn round_km(value: f64) -> f64 {
    let scale = 10_f64.powi(DISPLAY_PRECISION);
    (value * scale).round() / scale
}

/// Reasons a pair of bounds cannot form a usable range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ChainageRangeError {
    /// A bound is NaN or infinite.
    #[error("chainage bounds must be finite numbers")]
    NotFinite,
    /// A bound lies before the reference point.
    #[error("chainage must not be negative (got {value})")]
    Negative {
        /// The offending bound.
        value: f64,
    },
    /// The range is empty or inverted.
    #[error("start chainage {start} must be less than end chainage {end}")]
    Empty {
        /// Requested start.
        start: f64,
        /// Requested end.
        end: f64,
    },
}

/// A `[start, end)` chainage interval in kilometres.
///
/// # Examples
/// ```
/// use corridor::domain::ChainageRange;
///
/// let a = ChainageRange::new(0.0, 50.0).unwrap();
/// let b = ChainageRange::new(50.0, 100.0).unwrap();
/// assert!(!a.overlaps(&b));
/// assert!(ChainageRange::new(10.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainageRange {
    /// Inclusive start, kilometres from the reference point.
    #[schema(example = 0.0)]
    pub start: f64,
    /// Exclusive end, kilometres from the reference point.
    #[schema(example = 50.0)]
    pub end: f64,
}

impl ChainageRange {
    /// Validate and construct a range.
    pub fn new(start: f64, end: f64) -> Result<Self, ChainageRangeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ChainageRangeError::NotFinite);
        }
        if start < 0.0 {
            return Err(ChainageRangeError::Negative { value: start });
        }
        if end < 0.0 {
            return Err(ChainageRangeError::Negative { value: end });
        }
        let range = Self { start, end };
        if !range.is_valid() {
            return Err(ChainageRangeError::Empty { start, end });
        }
        Ok(range)
    }

    /// Build a range without validation.
    ///
    /// Used for records loaded from the store or bulk imports, which sweep
    /// checks must still be able to represent.
    #[must_use]
    pub const fn unchecked(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// `true` when the two ranges share any point.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `true` when `inner` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, inner: &Self) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// `true` when the range is non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Unrounded length in kilometres.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Copy with either bound replaced.
    #[must_use]
    pub fn with_bounds(&self, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            start: start.unwrap_or(self.start),
            end: end.unwrap_or(self.end),
        }
    }
}

impl fmt::Display for ChainageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}-{:.3} km", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn r(start: f64, end: f64) -> ChainageRange {
        ChainageRange::unchecked(start, end)
    }

    #[rstest]
    #[case(r(0.0, 50.0), r(50.0, 100.0), false)]
    #[case(r(50.0, 100.0), r(0.0, 50.0), false)]
    #[case(r(0.0, 50.0), r(40.0, 60.0), true)]
    #[case(r(0.0, 50.0), r(10.0, 20.0), true)]
    #[case(r(10.0, 20.0), r(0.0, 50.0), true)]
    #[case(r(0.0, 50.0), r(0.0, 50.0), true)]
    #[case(r(0.0, 10.0), r(20.0, 30.0), false)]
    fn overlaps_is_half_open_and_symmetric(
        #[case] a: ChainageRange,
        #[case] b: ChainageRange,
        #[case] expected: bool,
    ) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case(r(0.0, 50.0), r(0.0, 50.0), true)]
    #[case(r(0.0, 50.0), r(0.0, 20.0), true)]
    #[case(r(0.0, 50.0), r(20.0, 60.0), false)]
    #[case(r(10.0, 50.0), r(5.0, 20.0), false)]
    fn contains_accepts_shared_boundaries(
        #[case] outer: ChainageRange,
        #[case] inner: ChainageRange,
        #[case] expected: bool,
    ) {
        assert_eq!(outer.contains(&inner), expected);
    }

    #[rstest]
    #[case(10.0, 10.0)]
    #[case(20.0, 10.0)]
    fn empty_or_inverted_ranges_are_rejected(#[case] start: f64, #[case] end: f64) {
        assert!(!r(start, end).is_valid());
        assert!(matches!(
            ChainageRange::new(start, end),
            Err(ChainageRangeError::Empty { .. })
        ));
    }

    #[rstest]
    #[case(f64::NAN, 1.0, ChainageRangeError::NotFinite)]
    #[case(0.0, f64::INFINITY, ChainageRangeError::NotFinite)]
    #[case(-1.0, 1.0, ChainageRangeError::Negative { value: -1.0 })]
    fn malformed_bounds_are_rejected(
        #[case] start: f64,
        #[case] end: f64,
        #[case] expected: ChainageRangeError,
    ) {
        assert_eq!(ChainageRange::new(start, end), Err(expected));
    }

    #[rstest]
    #[case(20.0 - 0.0 + 45.0 - 20.0, 45.0)]
    #[case(12.34567, 12.346)]
    #[case(0.1 + 0.2, 0.3)]
    fn rounding_uses_three_decimals(#[case] raw: f64, #[case] expected: f64) {
        assert_eq!(round_km(raw), expected);
    }

    #[test]
    fn with_bounds_replaces_only_given_sides() {
        let base = r(0.0, 50.0);
        assert_eq!(base.with_bounds(Some(10.0), None), r(10.0, 50.0));
        assert_eq!(base.with_bounds(None, Some(60.0)), r(0.0, 60.0));
    }

    #[test]
    fn display_uses_three_decimals() {
        assert_eq!(r(0.0, 12.5).to_string(), "0.000-12.500 km");
    }
}
