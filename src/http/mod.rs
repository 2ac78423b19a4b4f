//! HTTP surface: router, shared state, identity extraction and the mapping
//! from core errors to response codes.

pub mod cart;
pub mod catalog;
pub mod orders;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::error::CommerceError;
use crate::pipeline::OrderPipeline;
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub pipeline: Arc<OrderPipeline>,
    pub pricing: PricingConfig,
}

impl AppState {
    pub fn new(store: Arc<MemoryStore>, pricing: PricingConfig) -> Self {
        let pipeline = Arc::new(OrderPipeline::new(store.clone(), store.clone(), pricing));
        Self {
            store,
            pipeline,
            pricing,
        }
    }
}

/// Session/user id from the `x-user-id` header. The identity collaborator
/// authenticated it upstream; the core trusts the value as the cart,
/// wishlist and order owner key.
pub struct UserId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .map(UserId)
            .ok_or_else(|| ApiError::bad_request("missing or invalid x-user-id header"))
    }
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        let status = match err {
            CommerceError::ProductNotFound
            | CommerceError::OrderNotFound
            | CommerceError::CouponNotFound
            | CommerceError::LineNotFound => StatusCode::NOT_FOUND,
            CommerceError::InvalidQuantity
            | CommerceError::EmptyCart
            | CommerceError::IncompleteAddress
            | CommerceError::CouponExpired
            | CommerceError::CouponBelowMinimumSpend
            | CommerceError::CouponUsageExhausted => StatusCode::BAD_REQUEST,
            CommerceError::CouponRaceExhausted | CommerceError::InvalidTransition => {
                StatusCode::CONFLICT
            }
            CommerceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/v1/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/api/v1/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/api/v1/coupons", post(catalog::create_coupon))
        .route("/api/v1/coupons/:code", get(catalog::get_coupon))
        .route(
            "/api/v1/cart",
            get(cart::get_cart).post(cart::add_item).delete(cart::clear_cart),
        )
        .route(
            "/api/v1/cart/items",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/v1/cart/coupon", post(cart::apply_coupon))
        .route("/api/v1/wishlist", get(cart::get_wishlist))
        .route("/api/v1/wishlist/toggle", post(cart::toggle_wishlist))
        .route("/api/v1/checkout", post(orders::checkout))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id/advance", post(orders::advance_order))
        .route("/api/v1/orders/:id/cancel", post(orders::cancel_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "service": "vastra-commerce"}))
}
