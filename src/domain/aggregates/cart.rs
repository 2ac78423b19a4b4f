//! Cart aggregate.
//!
//! One cart per user. Line identity is (product id, size): adding the same
//! pair again merges quantities instead of appending a second line. Prices
//! are snapshotted when the line is added, so later catalog edits do not
//! reprice a cart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::Money;
use crate::error::{CommerceError, Result};

#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub size: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub original_price: Money,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Per-line savings, clamped so a list price at or below the selling
    /// price contributes zero.
    pub fn line_savings(&self) -> Money {
        self.original_price.saturating_sub(self.unit_price).times(self.quantity)
    }

    fn matches(&self, product_id: Uuid, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    user_id: Uuid,
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            lines: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Immutable copy of the lines for handoff to the order pipeline.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    pub fn add_line(
        &mut self,
        product_id: Uuid,
        size: Option<String>,
        quantity: u32,
        unit_price: Money,
        original_price: Money,
    ) -> Result<()> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity);
        }
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, size.as_deref()))
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                product_id,
                size,
                quantity,
                unit_price,
                original_price,
            });
        }
        self.touch();
        Ok(())
    }

    /// Sets the quantity on a line; zero removes it. Missing lines are an
    /// error here, unlike `remove_line`.
    pub fn update_quantity(&mut self, product_id: Uuid, size: Option<&str>, quantity: u32) -> Result<()> {
        if !self.lines.iter().any(|l| l.matches(product_id, size)) {
            return Err(CommerceError::LineNotFound);
        }
        if quantity == 0 {
            self.lines.retain(|l| !l.matches(product_id, size));
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.matches(product_id, size)) {
            line.quantity = quantity;
        }
        self.touch();
        Ok(())
    }

    /// Removing an absent line is a no-op, not an error.
    pub fn remove_line(&mut self, product_id: Uuid, size: Option<&str>) {
        self.lines.retain(|l| !l.matches(product_id, size));
        self.touch();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
