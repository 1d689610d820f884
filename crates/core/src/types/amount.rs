//! Non-negative monetary amount using decimal arithmetic.
//!
//! Amounts arrive as JSON numbers and are summed exactly, so a docket total
//! of `100 + 250` is `350` with no floating-point drift. Entered amounts are
//! kept to cents and capped at [`Amount::MAX`], matching the `NUMERIC(14, 2)`
//! column they are stored in.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The value is below zero.
    #[error("amount must be a non-negative number")]
    Negative,
    /// The value is not a finite decimal number.
    #[error("amount must be a number")]
    NotANumber,
    /// A total no longer fits in a decimal.
    #[error("amount total is out of range")]
    Overflow,
}

/// A delivery amount (quantity or price, as entered by the operator).
///
/// Invariant: never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount accepted on a submission.
    // 99_999_999_999_999 at scale 2.
    pub const MAX: Self = Self(Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2));

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Negative` if `value < 0`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        Ok(Self(value.normalize()))
    }

    /// Create an amount from a float, keeping its shortest decimal form.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotANumber` for NaN/infinite input and
    /// `AmountError::Negative` for values below zero.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotANumber);
        }
        // `Display` for f64 prints the shortest string that round-trips.
        let decimal = Decimal::from_str(&value.to_string())
            .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
            .map_err(|_| AmountError::NotANumber)?;
        Self::new(decimal)
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Lossy conversion for display and JSON output.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Round to whole cents, half away from zero as Postgres does.
    #[must_use]
    pub fn to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
        )
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Overflow` when the sum exceeds the decimal range.
    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(|sum| Self(sum.normalize()))
            .ok_or(AmountError::Overflow)
    }

    /// Sum a sequence of amounts.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Overflow` when the running total exceeds the
    /// decimal range.
    pub fn total(amounts: impl IntoIterator<Item = Self>) -> Result<Self, AmountError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| AmountError::NotANumber)?;
        Self::new(decimal)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from_f64(n),
            Raw::Text(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let decimal = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(decimal)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Amount::from_f64(-0.01), Err(AmountError::Negative));
        assert_eq!("-5".parse::<Amount>(), Err(AmountError::Negative));
        assert!(Amount::from_f64(0.0).is_ok());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(Amount::from_f64(f64::NAN), Err(AmountError::NotANumber));
        assert_eq!(Amount::from_f64(f64::INFINITY), Err(AmountError::NotANumber));
    }

    #[test]
    fn test_sum_is_exact_for_decimal_inputs() {
        let amounts = [0.1, 0.2, 0.3].map(|v| Amount::from_f64(v).unwrap());
        let total = Amount::total(amounts).unwrap();
        assert_eq!(total, "0.6".parse().unwrap());
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let huge: Amount = "50000000000000000000000000000".parse().unwrap();
        assert_eq!(huge.checked_add(huge), Err(AmountError::Overflow));
        assert_eq!(Amount::total([huge, huge]), Err(AmountError::Overflow));
    }

    #[test]
    fn test_max_fits_numeric_14_2() {
        assert_eq!(Amount::MAX.to_string(), "999999999999.99");
        assert_eq!(Amount::MAX.to_cents(), Amount::MAX);
    }

    #[test]
    fn test_to_cents_rounds_half_away_from_zero() {
        let amount: Amount = "0.125".parse().unwrap();
        assert_eq!(amount.to_cents(), "0.13".parse().unwrap());
        let amount: Amount = "12.50".parse().unwrap();
        assert_eq!(amount.to_cents().to_string(), "12.5");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let n: Amount = serde_json::from_str("12.5").unwrap();
        let s: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(n, s);
        assert!(serde_json::from_str::<Amount>("-1").is_err());
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let amount: Amount = "350".parse().unwrap();
        assert_eq!(serde_json::to_value(amount).unwrap(), serde_json::json!(350.0));
    }
}
