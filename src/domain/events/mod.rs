//! Domain events raised by the order pipeline and logged at info level.

use crate::domain::aggregates::order::OrderStatus;
use crate::domain::value_objects::Money;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Order(OrderEvent),
    Coupon(CouponEvent),
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Placed {
        order_id: String,
        user_id: Uuid,
        total: Money,
    },
    StatusAdvanced {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    Cancelled {
        order_id: String,
    },
}

#[derive(Clone, Debug)]
pub enum CouponEvent {
    Redeemed { code: String, remaining: u32 },
}
