//! Order aggregate.
//!
//! Once placed, the line snapshot and money columns are immutable; only the
//! status moves, one step forward at a time along
//! confirmed -> processing -> shipped -> delivered, with cancellation
//! reachable from confirmed or processing only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::CartLine;
use crate::domain::value_objects::{Address, Money};
use crate::error::{CommerceError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The single permitted forward step, if any.
    pub fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Processing)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Order {
    id: String,
    user_id: Uuid,
    lines: Vec<CartLine>,
    subtotal: Money,
    shipping: Money,
    coupon_adjustment: Money,
    total: Money,
    coupon_code: Option<String>,
    shipping_address: Address,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        user_id: Uuid,
        lines: Vec<CartLine>,
        subtotal: Money,
        shipping: Money,
        coupon_adjustment: Money,
        total: Money,
        coupon_code: Option<String>,
        shipping_address: Address,
    ) -> Self {
        Self {
            id,
            user_id,
            lines,
            subtotal,
            shipping,
            coupon_adjustment,
            total,
            coupon_code,
            shipping_address,
            status: OrderStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn coupon_adjustment(&self) -> Money {
        self.coupon_adjustment
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves to `target` only if it is the immediate successor of the
    /// current status. Skips, backward moves and moves out of a terminal
    /// status all fail.
    pub fn advance_to(&mut self, target: OrderStatus) -> Result<()> {
        match self.status.successor() {
            Some(next) if next == target => {
                self.status = target;
                Ok(())
            }
            _ => Err(CommerceError::InvalidTransition),
        }
    }

    pub fn cancel(&mut self) -> Result<()> {
        if !self.status.is_cancellable() {
            return Err(CommerceError::InvalidTransition);
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            "VAS00000001".into(),
            Uuid::new_v4(),
            vec![],
            Money::new(9998),
            Money::ZERO,
            Money::ZERO,
            Money::new(9998),
            None,
            Address::default(),
        )
    }

    #[test]
    fn forward_steps_only() {
        let mut o = order();
        o.advance_to(OrderStatus::Processing).unwrap();
        o.advance_to(OrderStatus::Shipped).unwrap();
        o.advance_to(OrderStatus::Delivered).unwrap();
        assert_eq!(o.status(), OrderStatus::Delivered);
    }

    #[test]
    fn every_non_successor_transition_fails() {
        use OrderStatus::*;
        let all = [Confirmed, Processing, Shipped, Delivered, Cancelled];
        for from in all {
            for to in all {
                let mut o = order();
                o.status = from;
                let expected_ok = from.successor() == Some(to);
                assert_eq!(
                    o.advance_to(to).is_ok(),
                    expected_ok,
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn skipping_a_state_fails() {
        let mut o = order();
        assert_eq!(
            o.advance_to(OrderStatus::Delivered).unwrap_err(),
            CommerceError::InvalidTransition
        );
        assert_eq!(o.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn cancel_from_confirmed_and_processing_only() {
        let mut o = order();
        o.cancel().unwrap();
        assert_eq!(o.status(), OrderStatus::Cancelled);

        let mut o = order();
        o.advance_to(OrderStatus::Processing).unwrap();
        o.cancel().unwrap();

        let mut o = order();
        o.advance_to(OrderStatus::Processing).unwrap();
        o.advance_to(OrderStatus::Shipped).unwrap();
        assert_eq!(o.cancel().unwrap_err(), CommerceError::InvalidTransition);
    }

    #[test]
    fn terminal_states_admit_nothing() {
        let mut o = order();
        o.cancel().unwrap();
        assert_eq!(
            o.advance_to(OrderStatus::Processing).unwrap_err(),
            CommerceError::InvalidTransition
        );
        assert_eq!(o.cancel().unwrap_err(), CommerceError::InvalidTransition);
    }
}
