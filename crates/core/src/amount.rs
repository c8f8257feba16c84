//! Amount - Unsigned balance in base units
//!
//! Balances never go negative: subtraction is checked and the caller
//! decides what an underflow means (usually `InsufficientBalance`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// An unsigned amount in the ledger's smallest unit.
///
/// Serialized as a decimal string so that the full `u128` range survives
/// JSON round-trips.
///
/// # Example
/// ```
/// use hub_core::Amount;
///
/// let a = Amount::new(100);
/// let b = Amount::new(30);
/// assert_eq!(a.checked_sub(b), Some(Amount::new(70)));
/// assert_eq!(b.checked_sub(a), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(0);

    /// Create a new Amount
    #[inline]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Get the inner value
    #[inline]
    pub const fn value(&self) -> u128 {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u128>().map(Amount)
    }
}

impl TryFrom<String> for Amount {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}
