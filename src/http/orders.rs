//! Checkout and order-management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::aggregates::order::{Order, OrderStatus};
use crate::domain::value_objects::Address;
use crate::store::CartStore;

use super::{ApiError, AppState, UserId};

#[derive(Debug, Deserialize, Validate)]
pub struct ShippingAddressRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub pincode: String,
}

impl From<ShippingAddressRequest> for Address {
    fn from(req: ShippingAddressRequest) -> Self {
        Address {
            first_name: req.first_name,
            last_name: req.last_name,
            street: req.street,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate]
    pub shipping_address: ShippingAddressRequest,
    pub coupon_code: Option<String>,
}

/// Places the order from the current cart, then clears the cart. Every
/// failure leaves the cart intact so the user can correct and retry; a
/// `CouponRaceExhausted` conflict means "coupon no longer available" and the
/// order was not placed.
pub async fn checkout(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    req.validate()?;
    let cart = CartStore::new(s.store.clone(), user.0);
    let order = s.pipeline.place_order(
        user.0,
        cart.snapshot()?,
        req.shipping_address.into(),
        req.coupon_code.as_deref(),
    )?;
    cart.clear()?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(s): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(s.pipeline.list_orders_for_user(user.0)?))
}

pub async fn get_order(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(s.pipeline.get_order(&id)?))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub target: OrderStatus,
}

pub async fn advance_order(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(s.pipeline.advance_status(&id, req.target)?))
}

pub async fn cancel_order(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(s.pipeline.cancel(&id)?))
}
