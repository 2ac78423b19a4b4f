//! Order pipeline: turns a validated cart snapshot into a persisted order
//! and drives the status lifecycle afterwards.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::domain::aggregates::cart::CartLine;
use crate::domain::aggregates::order::{Order, OrderStatus};
use crate::domain::events::{CouponEvent, DomainEvent, OrderEvent};
use crate::domain::value_objects::Address;
use crate::error::{CommerceError, Result};
use crate::pricing;
use crate::store::{CouponRepo, OrderRepo};

/// Human-readable order ids: `VAS` + an eight-digit time-derived suffix.
const ORDER_ID_PREFIX: &str = "VAS";
const ID_ALLOC_ATTEMPTS: u64 = 100;

pub struct OrderPipeline {
    orders: Arc<dyn OrderRepo>,
    coupons: Arc<dyn CouponRepo>,
    pricing: PricingConfig,
}

impl OrderPipeline {
    pub fn new(orders: Arc<dyn OrderRepo>, coupons: Arc<dyn CouponRepo>, pricing: PricingConfig) -> Self {
        Self {
            orders,
            coupons,
            pricing,
        }
    }

    /// Places an order from a cart snapshot.
    ///
    /// Validation failures leave everything untouched; in particular a
    /// `CouponRaceExhausted` placement writes no order, so the caller keeps
    /// the cart and can retry without the coupon. On success the caller is
    /// expected to clear the originating cart.
    pub fn place_order(
        &self,
        user_id: Uuid,
        snapshot: Vec<CartLine>,
        address: Address,
        coupon_code: Option<&str>,
    ) -> Result<Order> {
        if snapshot.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        if !address.is_complete() {
            return Err(CommerceError::IncompleteAddress);
        }

        let now = Utc::now();
        let subtotal = pricing::subtotal(&snapshot);
        let coupon = match coupon_code {
            Some(code) => {
                let coupon = self
                    .coupons
                    .get_coupon(code)?
                    .ok_or(CommerceError::CouponNotFound)?;
                coupon.validate(subtotal, now)?;
                Some(coupon)
            }
            None => None,
        };

        let shipping = pricing::shipping(subtotal, &self.pricing);
        let adjustment = pricing::coupon_adjustment(subtotal, coupon.as_ref(), now);
        let total = pricing::total(subtotal, shipping, adjustment);

        // Redemption is the one shared-state step: the store checks the
        // limit and increments under a single lock, and a loser surfaces as
        // CouponRaceExhausted before anything is persisted. If the order
        // itself then fails to persist, the use is released again so a
        // failed placement never consumes one.
        if let Some(coupon) = &coupon {
            let remaining = self.coupons.redeem_coupon(&coupon.code)?;
            self.emit(DomainEvent::Coupon(CouponEvent::Redeemed {
                code: coupon.code.clone(),
                remaining,
            }));
        }

        let persisted = self.persist_with_unique_id(|id| {
            Order::new(
                id,
                user_id,
                snapshot.clone(),
                subtotal,
                shipping,
                adjustment,
                total,
                coupon.as_ref().map(|c| c.code.clone()),
                address.clone(),
            )
        });
        let order = match persisted {
            Ok(order) => order,
            Err(err) => {
                if let Some(coupon) = &coupon {
                    if let Err(release_err) = self.coupons.release_coupon(&coupon.code) {
                        tracing::warn!(
                            code = %coupon.code,
                            error = %release_err,
                            "failed to release coupon use after persist failure"
                        );
                    }
                }
                return Err(err);
            }
        };

        self.emit(DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id().to_string(),
            user_id,
            total: order.total(),
        }));
        Ok(order)
    }

    /// Moves an order one step forward; anything but the immediate
    /// successor is rejected by the aggregate.
    pub fn advance_status(&self, order_id: &str, target: OrderStatus) -> Result<Order> {
        let mut order = self.get_order(order_id)?;
        let from = order.status();
        order.advance_to(target)?;
        self.orders.save_order(order.clone())?;
        self.emit(DomainEvent::Order(OrderEvent::StatusAdvanced {
            order_id: order.id().to_string(),
            from,
            to: target,
        }));
        Ok(order)
    }

    pub fn cancel(&self, order_id: &str) -> Result<Order> {
        let mut order = self.get_order(order_id)?;
        order.cancel()?;
        self.orders.save_order(order.clone())?;
        self.emit(DomainEvent::Order(OrderEvent::Cancelled {
            order_id: order.id().to_string(),
        }));
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get_order(order_id)?
            .ok_or(CommerceError::OrderNotFound)
    }

    pub fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        self.orders.list_orders_for_user(user_id)
    }

    /// Allocates a time-derived id, bumping the suffix until the insert
    /// lands on a free one.
    fn persist_with_unique_id(&self, build: impl Fn(String) -> Order) -> Result<Order> {
        let millis = Utc::now().timestamp_millis().unsigned_abs();
        for attempt in 0..ID_ALLOC_ATTEMPTS {
            let id = format!("{ORDER_ID_PREFIX}{:08}", (millis + attempt) % 100_000_000);
            let order = build(id);
            if self.orders.insert_order(order.clone())? {
                return Ok(order);
            }
        }
        Err(CommerceError::Storage("order id space exhausted".into()))
    }

    fn emit(&self, event: DomainEvent) {
        tracing::info!(?event, "domain event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::coupon::{Coupon, DiscountKind};
    use crate::domain::value_objects::Money;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn pipeline() -> (Arc<MemoryStore>, OrderPipeline) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = OrderPipeline::new(store.clone(), store.clone(), PricingConfig::default());
        (store, pipeline)
    }

    fn line(unit: i64, original: i64, qty: u32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            size: Some("M".into()),
            quantity: qty,
            unit_price: Money::new(unit),
            original_price: Money::new(original),
        }
    }

    fn address() -> Address {
        Address {
            first_name: "Asha".into(),
            last_name: "Verma".into(),
            street: "12 MG Road".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            pincode: "302001".into(),
        }
    }

    fn coupon(code: &str, limit: u32) -> Coupon {
        Coupon {
            code: code.into(),
            kind: DiscountKind::Percent,
            value: 20,
            minimum_spend: Money::ZERO,
            expires_at: Utc::now() + Duration::days(1),
            usage_limit: limit,
            usage_count: 0,
        }
    }

    #[test]
    fn placing_an_order_snapshots_the_totals() {
        let (_, pipeline) = pipeline();
        let order = pipeline
            .place_order(Uuid::new_v4(), vec![line(4999, 6999, 2)], address(), None)
            .unwrap();
        assert!(order.id().starts_with("VAS"));
        assert_eq!(order.id().len(), 11);
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.subtotal(), Money::new(9998));
        assert_eq!(order.shipping(), Money::ZERO);
        assert_eq!(order.total(), Money::new(9998));
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let (_, pipeline) = pipeline();
        assert_eq!(
            pipeline
                .place_order(Uuid::new_v4(), vec![], address(), None)
                .unwrap_err(),
            CommerceError::EmptyCart
        );
    }

    #[test]
    fn blank_address_field_is_rejected() {
        let (_, pipeline) = pipeline();
        let mut addr = address();
        addr.pincode = "".into();
        assert_eq!(
            pipeline
                .place_order(Uuid::new_v4(), vec![line(500, 500, 1)], addr, None)
                .unwrap_err(),
            CommerceError::IncompleteAddress
        );
    }

    #[test]
    fn coupon_is_redeemed_exactly_once_per_order() {
        let (store, pipeline) = pipeline();
        store.insert_coupon(coupon("FESTIVE20", 5)).unwrap();
        let order = pipeline
            .place_order(
                Uuid::new_v4(),
                vec![line(4999, 6999, 2)],
                address(),
                Some("FESTIVE20"),
            )
            .unwrap();
        assert_eq!(order.coupon_adjustment(), Money::new(1999));
        assert_eq!(order.total(), Money::new(7999));
        assert_eq!(order.coupon_code(), Some("FESTIVE20"));
        assert_eq!(store.get_coupon("FESTIVE20").unwrap().unwrap().usage_count, 1);
    }

    #[test]
    fn unknown_and_expired_coupons_fail_placement() {
        let (store, pipeline) = pipeline();
        let snapshot = vec![line(4999, 6999, 2)];
        assert_eq!(
            pipeline
                .place_order(Uuid::new_v4(), snapshot.clone(), address(), Some("NOPE"))
                .unwrap_err(),
            CommerceError::CouponNotFound
        );

        let mut expired = coupon("OLD", 5);
        expired.expires_at = Utc::now() - Duration::hours(1);
        store.insert_coupon(expired).unwrap();
        assert_eq!(
            pipeline
                .place_order(Uuid::new_v4(), snapshot, address(), Some("OLD"))
                .unwrap_err(),
            CommerceError::CouponExpired
        );
        // The failed placements wrote nothing.
        assert!(pipeline
            .list_orders_for_user(Uuid::new_v4())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn concurrent_placements_cannot_over_redeem() {
        let (store, pipeline) = pipeline();
        store.insert_coupon(coupon("ONEUSE", 1)).unwrap();
        let pipeline = Arc::new(pipeline);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || {
                    pipeline.place_order(
                        Uuid::new_v4(),
                        vec![line(4999, 6999, 1)],
                        address(),
                        Some("ONEUSE"),
                    )
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let placed = outcomes.iter().filter(|r| r.is_ok()).count();
        let raced = outcomes
            .iter()
            .filter(|r| matches!(r, Err(CommerceError::CouponRaceExhausted)))
            .count();
        assert_eq!((placed, raced), (1, 1));
        assert_eq!(store.get_coupon("ONEUSE").unwrap().unwrap().usage_count, 1);
    }

    /// Order storage that never accepts an insert, as if the id space were
    /// exhausted.
    struct FullOrderRepo;

    impl OrderRepo for FullOrderRepo {
        fn insert_order(&self, _order: Order) -> crate::error::Result<bool> {
            Ok(false)
        }

        fn get_order(&self, _id: &str) -> crate::error::Result<Option<Order>> {
            Ok(None)
        }

        fn save_order(&self, _order: Order) -> crate::error::Result<()> {
            Err(CommerceError::OrderNotFound)
        }

        fn list_orders_for_user(&self, _user_id: Uuid) -> crate::error::Result<Vec<Order>> {
            Ok(vec![])
        }
    }

    #[test]
    fn failed_persist_does_not_consume_a_coupon_use() {
        let coupons = Arc::new(MemoryStore::new());
        coupons.insert_coupon(coupon("ONCE", 1)).unwrap();
        let pipeline = OrderPipeline::new(
            Arc::new(FullOrderRepo),
            coupons.clone(),
            PricingConfig::default(),
        );

        let err = pipeline
            .place_order(
                Uuid::new_v4(),
                vec![line(4999, 6999, 1)],
                address(),
                Some("ONCE"),
            )
            .unwrap_err();
        assert!(matches!(err, CommerceError::Storage(_)));
        // The increment was rolled back, so a retry can still redeem.
        assert_eq!(coupons.get_coupon("ONCE").unwrap().unwrap().usage_count, 0);
    }

    #[test]
    fn lifecycle_through_the_pipeline() {
        let (_, pipeline) = pipeline();
        let order = pipeline
            .place_order(Uuid::new_v4(), vec![line(500, 500, 1)], address(), None)
            .unwrap();
        let id = order.id().to_string();

        assert_eq!(
            pipeline
                .advance_status(&id, OrderStatus::Shipped)
                .unwrap_err(),
            CommerceError::InvalidTransition
        );
        pipeline.advance_status(&id, OrderStatus::Processing).unwrap();
        let cancelled = pipeline.cancel(&id).unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(
            pipeline
                .advance_status(&id, OrderStatus::Shipped)
                .unwrap_err(),
            CommerceError::InvalidTransition
        );
    }

    #[test]
    fn unknown_order_ids_are_reported() {
        let (_, pipeline) = pipeline();
        assert_eq!(
            pipeline.get_order("VAS00000000").unwrap_err(),
            CommerceError::OrderNotFound
        );
        assert_eq!(
            pipeline
                .advance_status("VAS00000000", OrderStatus::Processing)
                .unwrap_err(),
            CommerceError::OrderNotFound
        );
    }

    #[test]
    fn order_history_is_most_recent_first() {
        let (_, pipeline) = pipeline();
        let user = Uuid::new_v4();
        let first = pipeline
            .place_order(user, vec![line(500, 500, 1)], address(), None)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = pipeline
            .place_order(user, vec![line(1999, 2999, 1)], address(), None)
            .unwrap();

        let history = pipeline.list_orders_for_user(user).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id(), second.id());
        assert_eq!(history[1].id(), first.id());
    }

    #[test]
    fn simultaneous_placements_get_distinct_ids() {
        let (_, pipeline) = pipeline();
        let user = Uuid::new_v4();
        let a = pipeline
            .place_order(user, vec![line(500, 500, 1)], address(), None)
            .unwrap();
        let b = pipeline
            .place_order(user, vec![line(500, 500, 1)], address(), None)
            .unwrap();
        assert_ne!(a.id(), b.id());
    }
}
