//! Wishlist aggregate. Same ownership shape as the cart, but membership
//! only: no quantities, no sizes, no pricing.

use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct Wishlist {
    user_id: Uuid,
    product_ids: Vec<Uuid>,
}

impl Wishlist {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            product_ids: vec![],
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Adds when absent, removes when present; returns the resulting
    /// membership.
    pub fn toggle(&mut self, product_id: Uuid) -> bool {
        if self.contains(product_id) {
            self.product_ids.retain(|id| *id != product_id);
            false
        } else {
            self.product_ids.push(product_id);
            true
        }
    }

    pub fn contains(&self, product_id: Uuid) -> bool {
        self.product_ids.contains(&product_id)
    }

    /// Insertion order.
    pub fn list(&self) -> &[Uuid] {
        &self.product_ids
    }
}
