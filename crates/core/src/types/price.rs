//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored in the currency's standard unit (dollars, not cents)
//! and only converted to minor units at the payment boundary.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number: {0}")]
    Invalid(String),
}

/// A product price.
///
/// No range check is applied here. A zero or negative price is a legal
/// value; only the admin form refuses to submit one.
///
/// ```
/// use uniq_core::Price;
///
/// let total: Price = ["10", "5.5"].iter().map(|s| Price::parse(s).unwrap()).sum();
/// assert_eq!(total.display(), "15.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in minor units (cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price as typed into a form field.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or not a decimal number.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Self)
            .map_err(|_| PriceError::Invalid(s.to_owned()))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Format with exactly two decimal places (e.g. `15.50`).
    #[must_use]
    pub fn display(&self) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        rounded.to_string()
    }

    /// Amount in minor units (cents), rounded half away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Saturates at the decimal bounds instead of overflowing.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for Price {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <Decimal as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for Price {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, ::sqlx::error::BoxDynError> {
        let amount = <Decimal as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <Decimal as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_decimals_and_integers() {
        assert_eq!(Price::parse("10").unwrap().display(), "10.00");
        assert_eq!(Price::parse(" 5.5 ").unwrap().display(), "5.50");
        assert_eq!(Price::parse("-3").unwrap().display(), "-3.00");
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert!(matches!(Price::parse("ten"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_is_positive() {
        assert!(Price::parse("0.01").unwrap().is_positive());
        assert!(!Price::ZERO.is_positive());
        assert!(!Price::parse("-1").unwrap().is_positive());
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::parse("19.999").unwrap().display(), "20.00");
        assert_eq!(Price::parse("0.125").unwrap().display(), "0.13");
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(Price::parse("10").unwrap().to_minor_units(), Some(1000));
        assert_eq!(Price::parse("5.5").unwrap().to_minor_units(), Some(550));
        assert_eq!(Price::parse("0.005").unwrap().to_minor_units(), Some(1));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1550).display(), "15.50");
        assert_eq!(Price::from_cents(-250).display(), "-2.50");
    }

    #[test]
    fn test_sum() {
        let prices = [Price::parse("10").unwrap(), Price::parse("5.5").unwrap()];
        let total: Price = prices.iter().sum();
        assert_eq!(total.display(), "15.50");
    }

    #[test]
    fn test_sum_saturates_at_max() {
        let max = Price::parse("79228162514264337593543950335").unwrap();
        let total: Price = [max, max, Price::parse("1").unwrap()].iter().sum();
        assert_eq!(total, Price::new(Decimal::MAX));
        assert_eq!(total.to_minor_units(), None);

        let floor: Price = [Price::new(Decimal::MIN), Price::parse("-1").unwrap()]
            .iter()
            .sum();
        assert_eq!(floor, Price::new(Decimal::MIN));
    }
}
