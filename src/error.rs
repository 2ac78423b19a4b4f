//! Error types shared across the storefront core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Cart line not found")]
    LineNotFound,

    #[error("Coupon not found")]
    CouponNotFound,

    #[error("Coupon expired")]
    CouponExpired,

    #[error("Cart subtotal is below the coupon minimum spend")]
    CouponBelowMinimumSpend,

    #[error("Coupon usage limit reached")]
    CouponUsageExhausted,

    #[error("Coupon no longer available")]
    CouponRaceExhausted,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Shipping address is incomplete")]
    IncompleteAddress,

    #[error("Invalid order status transition")]
    InvalidTransition,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CommerceError>;
