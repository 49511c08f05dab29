//! Type-safe price representation.
//!
//! Prices are stored as a non-negative number of cents. Form input is
//! parsed through [`rust_decimal`] so that `10`, `10.5`, and `10.50` all
//! mean what a shopper expects, while rejecting negative amounts and
//! sub-cent precision.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number like 10 or 10.50")]
    Invalid,
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two fraction digits.
    #[error("price cannot have fractions of a cent")]
    SubCent,
    /// The amount does not fit in the supported range.
    #[error("price is too large")]
    TooLarge,
}

/// A price in integer cents.
///
/// ## Examples
///
/// ```
/// use larkspur_core::Price;
///
/// let price = Price::parse("10.50").unwrap();
/// assert_eq!(price.cents(), 1050);
/// assert_eq!(price.to_string(), "$10.50");
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("1.005").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Create a price from a number of cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents` is negative.
    pub const fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(cents))
    }

    /// Parse a price from decimal form input (e.g. `"10"` or `"10.50"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, negative,
    /// more precise than whole cents, or out of range.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid)?;

        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }

        if amount.scale() > 2 && amount.normalize().scale() > 2 {
            return Err(PriceError::SubCent);
        }

        let cents = (amount * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(PriceError::TooLarge)?;

        Ok(Self(cents))
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// The amount as a decimal number of currency units (e.g. `10.50`).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// The amount formatted for a form input field (e.g. `"10.50"`).
    #[must_use]
    pub fn input_value(&self) -> String {
        format!("{:.2}", self.amount())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.amount())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_number() {
        assert_eq!(Price::parse("10").unwrap().cents(), 1000);
    }

    #[test]
    fn test_parse_with_cents() {
        assert_eq!(Price::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Price::parse("10.99").unwrap().cents(), 1099);
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(Price::parse("0").unwrap().cents(), 0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Price::parse(" 12.00 ").unwrap().cents(), 1200);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Price::parse("ten"), Err(PriceError::Invalid));
        assert_eq!(Price::parse("10.0.0"), Err(PriceError::Invalid));
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_sub_cent() {
        assert_eq!(Price::parse("1.005"), Err(PriceError::SubCent));
    }

    #[test]
    fn test_parse_trailing_zero_scale_is_ok() {
        // "1.500" normalizes to 1.5
        assert_eq!(Price::parse("1.500").unwrap().cents(), 150);
    }

    #[test]
    fn test_from_cents_negative() {
        assert_eq!(Price::from_cents(-5), Err(PriceError::Negative));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1000).unwrap().to_string(), "$10.00");
        assert_eq!(Price::from_cents(1050).unwrap().to_string(), "$10.50");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "$0.05");
    }

    #[test]
    fn test_input_value() {
        assert_eq!(Price::from_cents(1099).unwrap().input_value(), "10.99");
    }
}
