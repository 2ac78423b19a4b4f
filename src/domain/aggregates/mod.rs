//! Aggregates module
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use coupon::{Coupon, DiscountKind};
pub use order::{Order, OrderStatus};
pub use product::{Category, Product, ProductFlags};
pub use wishlist::Wishlist;
