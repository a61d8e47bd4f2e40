//! Validated price of a pizza at a restaurant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest accepted price.
pub const MIN_PRICE: i64 = 1;
/// Highest accepted price.
pub const MAX_PRICE: i64 = 30;

/// Errors raised when a field value violates a declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Price outside `[MIN_PRICE, MAX_PRICE]`.
    #[error("Price must be between 1 and 30")]
    PriceOutOfRange(i64),
}

/// Check a candidate price against the accepted range.
///
/// Both bounds are inclusive.
pub fn validate_price(value: i64) -> Result<i64, ValidationError> {
    if (MIN_PRICE..=MAX_PRICE).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::PriceOutOfRange(value))
    }
}

/// A price in `[1, 30]`.
///
/// Every way of obtaining a `Price` (construction, conversion, deserialization)
/// goes through [`validate_price`], so an out-of-range value cannot be held by
/// an entity or handed to a repository.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Price(i32);

impl Price {
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        let value = validate_price(value)?;
        // The range check above keeps the value well inside i32.
        Ok(Price(value as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Price {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl TryFrom<i32> for Price {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Price::new(i64::from(value))
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        i64::from(price.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(validate_price(1), Ok(1));
        assert_eq!(validate_price(30), Ok(30));
        assert_eq!(Price::new(15).unwrap().value(), 15);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        for value in [0, 31, -1, -30, 35, i64::MAX, i64::MIN] {
            let err = Price::new(value).unwrap_err();
            assert_eq!(err, ValidationError::PriceOutOfRange(value));
            assert_eq!(err.to_string(), "Price must be between 1 and 30");
        }
    }

    #[test]
    fn test_serde_runs_validation() {
        let price: Price = serde_json::from_str("12").unwrap();
        assert_eq!(price.value(), 12);
        assert_eq!(serde_json::to_string(&price).unwrap(), "12");

        let err = serde_json::from_str::<Price>("31").unwrap_err();
        assert!(err.to_string().contains("Price must be between 1 and 30"));
    }
}
