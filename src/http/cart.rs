//! Cart, coupon-application and wishlist handlers. Responses always carry
//! the derived totals; nothing derived is ever stored.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::error::CommerceError;
use crate::pricing::{self, Quote};
use crate::store::{CartStore, CouponRepo, ProductRepo, WishlistStore};

use super::{ApiError, AppState, UserId};

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: Quote,
}

impl CartResponse {
    fn from_cart(cart: &Cart, state: &AppState) -> Self {
        Self {
            lines: cart.snapshot(),
            totals: pricing::quote(cart.lines(), None, &state.pricing, Utc::now()),
        }
    }
}

fn cart_store(state: &AppState, user: &UserId) -> CartStore {
    CartStore::new(state.store.clone(), user.0)
}

pub async fn get_cart(State(s): State<AppState>, user: UserId) -> Result<Json<CartResponse>, ApiError> {
    let cart = cart_store(&s, &user).cart()?;
    Ok(Json(CartResponse::from_cart(&cart, &s)))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub size: Option<String>,
    pub quantity: i64,
}

pub async fn add_item(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let quantity =
        u32::try_from(req.quantity).map_err(|_| CommerceError::InvalidQuantity)?;
    let product = s
        .store
        .get_product(req.product_id)?
        .ok_or(CommerceError::ProductNotFound)?;
    let cart = cart_store(&s, &user).add_item(&product, req.size, quantity)?;
    Ok((StatusCode::CREATED, Json(CartResponse::from_cart(&cart, &s))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub product_id: Uuid,
    pub size: Option<String>,
    pub quantity: i64,
}

pub async fn update_item(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let quantity = removal_or_quantity(req.quantity)?;
    let cart =
        cart_store(&s, &user).update_quantity(req.product_id, req.size.as_deref(), quantity)?;
    Ok(Json(CartResponse::from_cart(&cart, &s)))
}

/// Zero or negative means "remove the line"; a positive quantity that does
/// not fit in a u32 is rejected rather than silently treated as a removal.
fn removal_or_quantity(requested: i64) -> Result<u32, CommerceError> {
    if requested <= 0 {
        return Ok(0);
    }
    u32::try_from(requested).map_err(|_| CommerceError::InvalidQuantity)
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: Uuid,
    pub size: Option<String>,
}

pub async fn remove_item(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = cart_store(&s, &user).remove_item(req.product_id, req.size.as_deref())?;
    Ok(Json(CartResponse::from_cart(&cart, &s)))
}

pub async fn clear_cart(State(s): State<AppState>, user: UserId) -> Result<StatusCode, ApiError> {
    cart_store(&s, &user).clear()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CouponQuoteResponse {
    pub code: String,
    pub totals: Quote,
}

/// Validates a coupon against the current cart. The explicit rejection
/// path: expiry, minimum spend and usage limit each map to their own error.
/// Nothing is redeemed here; only checkout consumes a use.
pub async fn apply_coupon(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<ApplyCouponRequest>,
) -> Result<Json<CouponQuoteResponse>, ApiError> {
    let cart = cart_store(&s, &user).cart()?;
    let now = Utc::now();
    let coupon = s
        .store
        .get_coupon(&req.code)?
        .ok_or(CommerceError::CouponNotFound)?;
    coupon.validate(pricing::subtotal(cart.lines()), now)?;
    let totals = pricing::quote(cart.lines(), Some(&coupon), &s.pricing, now);
    Ok(Json(CouponQuoteResponse {
        code: coupon.code,
        totals,
    }))
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub product_ids: Vec<Uuid>,
}

pub async fn get_wishlist(
    State(s): State<AppState>,
    user: UserId,
) -> Result<Json<WishlistResponse>, ApiError> {
    let product_ids = WishlistStore::new(s.store.clone(), user.0).list()?;
    Ok(Json(WishlistResponse { product_ids }))
}

#[derive(Debug, Deserialize)]
pub struct ToggleWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleWishlistResponse {
    pub product_id: Uuid,
    pub in_wishlist: bool,
}

pub async fn toggle_wishlist(
    State(s): State<AppState>,
    user: UserId,
    Json(req): Json<ToggleWishlistRequest>,
) -> Result<Json<ToggleWishlistResponse>, ApiError> {
    let in_wishlist = WishlistStore::new(s.store.clone(), user.0).toggle(req.product_id)?;
    Ok(Json(ToggleWishlistResponse {
        product_id: req.product_id,
        in_wishlist,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_quantities_map_to_removal_or_set() {
        assert_eq!(removal_or_quantity(0), Ok(0));
        assert_eq!(removal_or_quantity(-3), Ok(0));
        assert_eq!(removal_or_quantity(5), Ok(5));
    }

    #[test]
    fn oversized_quantity_is_rejected_not_removed() {
        assert_eq!(
            removal_or_quantity(i64::from(u32::MAX) + 1),
            Err(CommerceError::InvalidQuantity)
        );
    }
}
