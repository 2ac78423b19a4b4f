//! Vastra Commerce
//!
//! Fashion storefront backend: the cart / pricing / coupon / order-lifecycle
//! core, plus a thin HTTP surface for the catalog and admin collaborators.
//!
//! ## Shape
//! - `domain` — aggregates (cart, coupon, order, product, wishlist), value
//!   objects and events
//! - `pricing` — pure derivation of subtotal, savings, shipping, coupon
//!   adjustment and total
//! - `store` — repository traits and the in-memory document store,
//!   including atomic coupon redemption
//! - `pipeline` — checkout and the order status machine
//! - `http` — axum router and handlers

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod pricing;
pub mod store;

pub use error::{CommerceError, Result};
