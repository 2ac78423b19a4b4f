//! Coupon reference data and validation rules.
//!
//! Validation never touches the usage count; only order placement redeems a
//! coupon, through the store's atomic check-then-increment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;
use crate::error::{CommerceError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is an integer percentage 0..=100 of the subtotal.
    Percent,
    /// `value` is an absolute amount in minor units.
    Flat,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub minimum_spend: Money,
    pub expires_at: DateTime<Utc>,
    pub usage_limit: u32,
    pub usage_count: u32,
}

impl Coupon {
    pub fn is_exhausted(&self) -> bool {
        self.usage_count >= self.usage_limit
    }

    /// Checks the coupon against a cart subtotal. Order matters: expiry,
    /// then minimum spend (a subtotal equal to the minimum is accepted),
    /// then the usage limit.
    pub fn validate(&self, subtotal: Money, now: DateTime<Utc>) -> Result<()> {
        if now > self.expires_at {
            return Err(CommerceError::CouponExpired);
        }
        if subtotal < self.minimum_spend {
            return Err(CommerceError::CouponBelowMinimumSpend);
        }
        if self.is_exhausted() {
            return Err(CommerceError::CouponUsageExhausted);
        }
        Ok(())
    }
}
