//! Product reference data.
//!
//! Products are owned by the catalog; the cart and order pipeline only read
//! them to snapshot prices and sizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Selling price.
    pub price: Money,
    /// List price before discount; not guaranteed to exceed `price`.
    pub original_price: Money,
    /// Integer 0..=100, display-only.
    pub discount_percent: u8,
    pub category: String,
    pub subcategory: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[serde(default)]
    pub flags: ProductFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ProductFlags {
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default)]
    pub is_summer: bool,
    #[serde(default)]
    pub is_winter: bool,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money, original_price: Money, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            original_price,
            discount_percent: discount_percent(price, original_price),
            category: category.into(),
            subcategory: None,
            sizes: vec![],
            colors: vec![],
            flags: ProductFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Display discount, truncated. Zero when the list price is not above the
/// selling price.
pub fn discount_percent(price: Money, original_price: Money) -> u8 {
    if original_price <= price || original_price.is_zero() {
        return 0;
    }
    let saved = original_price.amount() - price.amount();
    ((saved * 100) / original_price.amount()).clamp(0, 100) as u8
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "-");
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: Utc::now(),
        }
    }
}
