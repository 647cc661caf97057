//! Exact decimal money amounts.
//!
//! Amounts keep full precision in stored and computed state; rounding to
//! cents happens only when an amount is rendered with [`Money::display`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount in the store's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create an amount from a count of cents.
    ///
    /// Negative input is clamped to zero.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), 2))
    }

    /// The exact underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount multiplied by a quantity, without rounding.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Round half away from zero to cents.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Presentation string with exactly two decimal places (`"7.00"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}", self.rounded())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
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
        let err = Money::new(Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err, MoneyError::Negative(Decimal::new(-1, 2)));
        assert!(Money::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_is_exact() {
        let price = Money::from_cents(350);
        assert_eq!(price.times(2).amount(), Decimal::new(700, 2));
        assert_eq!(price.times(2).display(), "7.00");
    }

    #[test]
    fn test_repeated_addition_does_not_drift() {
        let price = Money::new(Decimal::new(1, 1)).unwrap();
        let total: Money = std::iter::repeat_n(price, 1000).sum();
        assert_eq!(total.amount(), Decimal::new(100, 0));
        assert_eq!(total, price.times(1000));
    }

    #[test]
    fn test_display_rounds_only_at_presentation() {
        let third = Money::new(Decimal::new(3_335, 3)).unwrap();
        assert_eq!(third.amount(), Decimal::new(3_335, 3));
        assert_eq!(third.display(), "3.34");
        assert_eq!(Money::ZERO.display(), "0.00");
    }
}
