//! Non-negative monetary amounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Rejected amount values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// NaN or infinite.
    #[error("amount must be a finite number")]
    NotFinite,
    /// Below zero.
    #[error("amount must not be negative")]
    Negative,
}

/// Price, budget or cost in the marketplace's single currency.
///
/// # Examples
/// ```
/// use backend::domain::Amount;
///
/// assert!(Amount::new(-1.0).is_err());
/// assert_eq!(Amount::new(500.0).expect("valid amount").value(), 500.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "f64", into = "f64")]
#[schema(value_type = f64)]
pub struct Amount(f64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0.0);

    /// Validate a raw amount.
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        if value < 0.0 {
            return Err(AmountError::Negative);
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
