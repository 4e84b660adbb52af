//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Balances are compared against zero at a fixed scale of eight decimals.

use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scale at which a running balance is compared against zero.
pub const BALANCE_SCALE: u32 = 8;

/// Scale funding sums are rounded to before labelling.
pub const FUNDING_SCALE: u32 = 10;

/// Decimal amount used for sizes, prices, totals, fees and loan principals.
///
/// Serializes as a string so reports never lose digits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::str")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// Accepts plain and scientific notation (`1e-5`), surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        let s = s.trim();
        RustDecimal::from_str(s)
            .or_else(|_| RustDecimal::from_scientific(s))
            .map(Decimal)
    }

    /// Parse, coercing anything unparsable (including an empty cell) to `None`.
    pub fn coerce(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            return None;
        }
        Self::from_str_canonical(s).ok()
    }

    /// Format without exponent notation and without trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// `None` when the sum leaves the representable range.
    pub fn checked_add(&self, rhs: Decimal) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    /// `None` when the product leaves the representable range.
    pub fn checked_mul(&self, rhs: Decimal) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Round half-to-even at `dp` fractional digits.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// True when the value rounds to zero at [`BALANCE_SCALE`].
    pub fn is_flat(&self) -> bool {
        self.round_dp(BALANCE_SCALE).is_zero()
    }

    /// The value expressed as an outflow: positive values are negated, others kept.
    pub fn as_outflow(&self) -> Self {
        if self.is_positive() {
            -*self
        } else {
            *self
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_scientific() {
        assert_eq!(d("0.00001"), d("1e-5"));
        assert_eq!(d(" 12.5 ").to_canonical_string(), "12.5");
    }

    #[test]
    fn test_coerce_unparsable_to_none() {
        assert_eq!(Decimal::coerce("abc"), None);
        assert_eq!(Decimal::coerce(""), None);
        assert_eq!(Decimal::coerce("  "), None);
        assert_eq!(Decimal::coerce("3.25"), Some(d("3.25")));
    }

    #[test]
    fn test_canonical_string_strips_trailing_zeros() {
        assert_eq!(d("1000.0000").to_canonical_string(), "1000");
        assert_eq!(d("-0.50").to_canonical_string(), "-0.5");
    }

    #[test]
    fn test_is_flat_at_balance_scale() {
        assert!(d("0").is_flat());
        assert!(d("0.000000004").is_flat());
        assert!(d("-0.000000004").is_flat());
        assert!(!d("0.00000001").is_flat());
        assert!(!d("-0.000000006").is_flat());
    }

    #[test]
    fn test_round_dp_is_half_even() {
        assert_eq!(d("0.125").round_dp(2), d("0.12"));
        assert_eq!(d("0.135").round_dp(2), d("0.14"));
    }

    #[test]
    fn test_as_outflow() {
        assert_eq!(d("2.5").as_outflow(), d("-2.5"));
        assert_eq!(d("-2.5").as_outflow(), d("-2.5"));
        assert_eq!(d("0").as_outflow(), d("0"));
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = Decimal::new(RustDecimal::MAX);
        assert_eq!(max.checked_mul(d("2")), None);
        assert_eq!(max.checked_add(d("1")), None);
        assert_eq!(d("1.5").checked_mul(d("2")), Some(d("3")));
        assert_eq!(d("1.5").checked_add(d("-2")), Some(d("-0.5")));
    }

    #[test]
    fn test_json_serialization_is_lossless_string() {
        let json = serde_json::to_value(d("123.456000001")).unwrap();
        assert_eq!(json, serde_json::json!("123.456000001"));
    }
}
