//! Value objects for the storefront core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in the smallest currency unit. All pricing arithmetic is
/// integer arithmetic; there is no floating point anywhere in the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn add(&self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Subtraction floored at zero; a total never goes negative.
    pub fn saturating_sub(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    pub fn times(&self, qty: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(qty)))
    }

    pub fn min(&self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// `percent` is an integer 0..=100. Truncates toward zero, so 20% of
    /// 9998 is 1999.
    pub fn percent_of(&self, percent: i64) -> Money {
        Money(self.0.saturating_mul(percent) / 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shipping address captured at checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    /// Every field is required; whitespace-only counts as blank.
    pub fn is_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.street,
            &self.city,
            &self.state,
            &self.pincode,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}
