//! Pricing engine: pure functions over a cart snapshot.
//!
//! Nothing in here mutates state or performs I/O; the cart, checkout and
//! order pipeline all derive their money columns by calling through this
//! module so the arithmetic lives in exactly one place.

use chrono::{DateTime, Utc};

use crate::config::PricingConfig;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::aggregates::coupon::{Coupon, DiscountKind};
use crate::domain::value_objects::Money;

/// Sum of unit price x quantity over all lines. Zero for an empty cart.
pub fn subtotal(lines: &[CartLine]) -> Money {
    lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc.add(line.line_total()))
}

/// Sum of (original - unit) x quantity, clamped per line so a list price at
/// or below the selling price contributes zero, never a negative amount.
pub fn savings(lines: &[CartLine]) -> Money {
    lines
        .iter()
        .fold(Money::ZERO, |acc, line| acc.add(line.line_savings()))
}

/// Free at or above the configured threshold, otherwise the flat fee.
pub fn shipping(subtotal: Money, cfg: &PricingConfig) -> Money {
    if subtotal >= cfg.free_shipping_threshold {
        Money::ZERO
    } else {
        cfg.shipping_flat_fee
    }
}

/// Discount taken off the subtotal for an applied coupon.
///
/// This is the silent path: an absent, expired, below-minimum or exhausted
/// coupon yields zero rather than an error. The explicit rejection path is
/// [`Coupon::validate`].
pub fn coupon_adjustment(subtotal: Money, coupon: Option<&Coupon>, now: DateTime<Utc>) -> Money {
    let Some(coupon) = coupon else {
        return Money::ZERO;
    };
    if coupon.validate(subtotal, now).is_err() {
        return Money::ZERO;
    }
    let adjustment = match coupon.kind {
        // Truncating integer division; the adjustment can never exceed the
        // subtotal.
        DiscountKind::Percent => subtotal.percent_of(coupon.value).min(subtotal),
        DiscountKind::Flat => Money::new(coupon.value).min(subtotal),
    };
    std::cmp::max(adjustment, Money::ZERO)
}

/// subtotal - adjustment + shipping, floored at zero.
pub fn total(subtotal: Money, shipping: Money, adjustment: Money) -> Money {
    subtotal.saturating_sub(adjustment).add(shipping)
}

/// All derived cart values in one pass; what the cart endpoints return and
/// the order pipeline persists.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct Quote {
    pub subtotal: Money,
    pub savings: Money,
    pub shipping: Money,
    pub coupon_adjustment: Money,
    pub total: Money,
}

pub fn quote(
    lines: &[CartLine],
    coupon: Option<&Coupon>,
    cfg: &PricingConfig,
    now: DateTime<Utc>,
) -> Quote {
    let subtotal = self::subtotal(lines);
    let savings = self::savings(lines);
    let shipping = self::shipping(subtotal, cfg);
    let coupon_adjustment = self::coupon_adjustment(subtotal, coupon, now);
    let total = self::total(subtotal, shipping, coupon_adjustment);
    Quote {
        subtotal,
        savings,
        shipping,
        coupon_adjustment,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn line(unit: i64, original: i64, qty: u32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            size: None,
            quantity: qty,
            unit_price: Money::new(unit),
            original_price: Money::new(original),
        }
    }

    fn cfg() -> PricingConfig {
        PricingConfig::default()
    }

    fn percent_coupon(value: i64) -> Coupon {
        Coupon {
            code: "SAVE".into(),
            kind: DiscountKind::Percent,
            value,
            minimum_spend: Money::ZERO,
            expires_at: Utc::now() + Duration::days(1),
            usage_limit: 10,
            usage_count: 0,
        }
    }

    #[test]
    fn two_kurta_sets_ship_free() {
        // Worked example: 4999/6999 x 2.
        let lines = vec![line(4999, 6999, 2)];
        let q = quote(&lines, None, &cfg(), Utc::now());
        assert_eq!(q.subtotal, Money::new(9998));
        assert_eq!(q.savings, Money::new(4000));
        assert_eq!(q.shipping, Money::ZERO);
        assert_eq!(q.total, Money::new(9998));
    }

    #[test]
    fn small_order_pays_the_flat_fee() {
        let lines = vec![line(500, 500, 1)];
        let q = quote(&lines, None, &cfg(), Utc::now());
        assert_eq!(q.shipping, Money::new(99));
        assert_eq!(q.total, Money::new(599));
    }

    #[test]
    fn subtotal_at_the_threshold_ships_free() {
        assert_eq!(shipping(Money::new(999), &cfg()), Money::ZERO);
        assert_eq!(shipping(Money::new(998), &cfg()), Money::new(99));
    }

    #[test]
    fn empty_cart_quotes_to_the_fee_alone_never_negative() {
        let q = quote(&[], None, &cfg(), Utc::now());
        assert_eq!(q.subtotal, Money::ZERO);
        assert_eq!(q.savings, Money::ZERO);
        assert_eq!(q.total, q.shipping);
    }

    #[test]
    fn percent_adjustment_truncates() {
        // 20% of 9998 is 1999.6, truncated to 1999.
        let adj = coupon_adjustment(Money::new(9998), Some(&percent_coupon(20)), Utc::now());
        assert_eq!(adj, Money::new(1999));
        assert_eq!(
            total(Money::new(9998), Money::ZERO, adj),
            Money::new(7999)
        );
    }

    #[test]
    fn flat_adjustment_caps_at_the_subtotal() {
        let coupon = Coupon {
            kind: DiscountKind::Flat,
            value: 2000,
            ..percent_coupon(0)
        };
        assert_eq!(
            coupon_adjustment(Money::new(1500), Some(&coupon), Utc::now()),
            Money::new(1500)
        );
        assert_eq!(
            coupon_adjustment(Money::new(5000), Some(&coupon), Utc::now()),
            Money::new(2000)
        );
    }

    #[test]
    fn invalid_coupon_adjusts_nothing() {
        let mut expired = percent_coupon(20);
        expired.expires_at = Utc::now() - Duration::hours(1);
        assert_eq!(
            coupon_adjustment(Money::new(9998), Some(&expired), Utc::now()),
            Money::ZERO
        );

        let mut below_min = percent_coupon(20);
        below_min.minimum_spend = Money::new(10_000);
        assert_eq!(
            coupon_adjustment(Money::new(9998), Some(&below_min), Utc::now()),
            Money::ZERO
        );

        let mut used_up = percent_coupon(20);
        used_up.usage_count = used_up.usage_limit;
        assert_eq!(
            coupon_adjustment(Money::new(9998), Some(&used_up), Utc::now()),
            Money::ZERO
        );

        assert_eq!(coupon_adjustment(Money::new(9998), None, Utc::now()), Money::ZERO);
    }

    #[test]
    fn total_identity_holds() {
        let lines = vec![line(4999, 6999, 2), line(500, 700, 1)];
        let coupon = percent_coupon(20);
        let now = Utc::now();
        let q = quote(&lines, Some(&coupon), &cfg(), now);
        assert_eq!(
            q.total,
            total(q.subtotal, q.shipping, q.coupon_adjustment)
        );
        assert!(q.total >= Money::ZERO);
    }
}
