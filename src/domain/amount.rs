//! Money types
//!
//! Fixed-point domain primitives for withdrawal amounts and wallet balances.
//! Both are validated at construction time, so a negative balance or a
//! non-positive withdrawal cannot exist past the boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount or balance (1 trillion)
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Fractional digits kept for every monetary value (cents)
pub const MONEY_SCALE: u32 = 2;

/// Amount represents a validated, strictly positive withdrawal value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - At most 2 decimal places, stored with scale 2
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use wallet_api::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(3000, 2)).unwrap();
/// assert_eq!(amount.to_string(), "30.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be greater than 0 (got {0})")]
    NotPositive(Decimal),

    #[error("Balance cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max 2, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value (1 trillion)")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

/// Drop trailing zeros before checking precision, so `30.000` is accepted
/// as `30.00` but `30.001` is not.
fn check_scale(value: Decimal) -> Result<Decimal, AmountError> {
    let normalized = value.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(AmountError::TooManyDecimals(normalized.scale()));
    }

    let mut scaled = normalized;
    scaled.rescale(MONEY_SCALE);
    Ok(scaled)
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 2 significant decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let value = check_scale(value)?;

        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance represents a wallet balance (zero or positive).
///
/// Unlike `Amount` there is no upper bound: any non-negative `NUMERIC(20,2)`
/// stored in the wallets table is a valid balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Balance(Decimal);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }

        Ok(Self(check_scale(value)?))
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if balance covers the requested amount
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Balance {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100)).unwrap();
        assert_eq!(amount.value(), dec!(100.00));
        assert_eq!(amount.value().scale(), MONEY_SCALE);
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-50.0));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        let amount = Amount::new(dec!(0.001));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_trailing_zeros_accepted() {
        let amount = Amount::new(dec!(30.000)).unwrap();
        assert_eq!(amount.to_string(), "30.00");
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000000000.01));
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        let amount = Amount::new(dec!(1000000000000));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 50.01 ".parse().unwrap();
        assert_eq!(amount.value(), dec!(50.01));

        let bad: Result<Amount, _> = "fifty".parse();
        assert!(matches!(bad, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_deserialize_from_number_and_string() {
        let from_number: Amount = serde_json::from_str("30.5").unwrap();
        assert_eq!(from_number.value(), dec!(30.50));

        let from_string: Amount = serde_json::from_str("\"30.50\"").unwrap();
        assert_eq!(from_number, from_string);

        let zero: Result<Amount, _> = serde_json::from_str("0");
        assert!(zero.is_err());
    }

    #[test]
    fn test_balance_debit() {
        let balance = Balance::new(dec!(100.00)).unwrap();
        let amount = Amount::new(dec!(30.00)).unwrap();

        let balance = balance.debit(&amount).unwrap();
        assert_eq!(balance.value(), dec!(70.00));
        assert_eq!(balance.to_string(), "70.00");
    }

    #[test]
    fn test_balance_exact_debit_reaches_zero() {
        let balance = Balance::new(dec!(50.00)).unwrap();
        let amount = Amount::new(dec!(50.00)).unwrap();

        assert!(balance.is_sufficient_for(&amount));
        let balance = balance.debit(&amount).unwrap();
        assert_eq!(balance.value(), Decimal::ZERO);
        assert_eq!(balance.to_string(), "0.00");
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(dec!(50.00)).unwrap();
        let amount = Amount::new(dec!(50.01)).unwrap();

        assert!(!balance.is_sufficient_for(&amount));
        assert!(matches!(balance.debit(&amount), Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_balance_negative_rejected() {
        assert!(matches!(Balance::new(dec!(-0.01)), Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_balance_has_no_upper_bound() {
        let balance = Balance::new(dec!(2000000000000.00)).unwrap();
        assert_eq!(balance.value(), dec!(2000000000000.00));

        let balance = balance.debit(&Amount::new(dec!(0.01)).unwrap()).unwrap();
        assert_eq!(balance.to_string(), "1999999999999.99");
    }

    #[test]
    fn test_max_amount_constant() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000));
    }
}
