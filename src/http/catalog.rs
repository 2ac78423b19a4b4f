//! Catalog and admin handlers: product, category and coupon CRUD. The core
//! only reads these records; writes come from the admin surface.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::coupon::{Coupon, DiscountKind};
use crate::domain::aggregates::product::{discount_percent, Category, Product, ProductFlags};
use crate::domain::value_objects::Money;
use crate::error::CommerceError;
use crate::store::{CategoryRepo, CouponRepo, ProductRepo};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub bestseller: Option<bool>,
    pub new: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
}

pub async fn list_products(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100) as usize;

    let mut products = s.store.list_products()?;
    if let Some(category) = &p.category {
        products.retain(|prod| prod.category.eq_ignore_ascii_case(category));
    }
    if let Some(subcategory) = &p.subcategory {
        products.retain(|prod| {
            prod.subcategory
                .as_deref()
                .is_some_and(|sub| sub.eq_ignore_ascii_case(subcategory))
        });
    }
    if p.bestseller == Some(true) {
        products.retain(|prod| prod.flags.is_bestseller);
    }
    if p.new == Some(true) {
        products.retain(|prod| prod.flags.is_new);
    }
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = products.len();
    let start = ((page - 1) as usize * per_page).min(total);
    let data = products.into_iter().skip(start).take(per_page).collect();
    Ok(Json(PaginatedResponse { data, total, page }))
}

pub async fn get_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = s
        .store
        .get_product(id)?
        .ok_or(CommerceError::ProductNotFound)?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub price: i64,
    pub original_price: i64,
    #[validate(length(min = 1))]
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub flags: ProductFlags,
}

impl ProductRequest {
    fn apply(self, mut product: Product) -> Product {
        let price = Money::new(self.price);
        let original_price = Money::new(self.original_price);
        product.name = self.name;
        product.price = price;
        product.original_price = original_price;
        product.discount_percent = discount_percent(price, original_price);
        product.category = self.category;
        product.subcategory = self.subcategory;
        product.sizes = self.sizes;
        product.colors = self.colors;
        product.flags = self.flags;
        product.updated_at = Utc::now();
        product
    }
}

pub async fn create_product(
    State(s): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    req.validate()?;
    if req.price < 0 || req.original_price < 0 {
        return Err(ApiError::bad_request("prices must not be negative"));
    }
    let base = Product::new("", Money::ZERO, Money::ZERO, "");
    let product = req.apply(base);
    s.store.insert_product(product.clone())?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    req.validate()?;
    let existing = s
        .store
        .get_product(id)?
        .ok_or(CommerceError::ProductNotFound)?;
    let product = req.apply(existing);
    s.store.update_product(product.clone())?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    s.store.delete_product(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let mut categories = s.store.list_categories()?;
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(categories))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
}

pub async fn create_category(
    State(s): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    req.validate()?;
    let category = Category::new(req.name);
    s.store.insert_category(category.clone())?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CouponRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    #[serde(default)]
    pub minimum_spend: i64,
    pub expires_at: DateTime<Utc>,
    pub usage_limit: u32,
}

pub async fn create_coupon(
    State(s): State<AppState>,
    Json(req): Json<CouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    req.validate()?;
    if req.kind == DiscountKind::Percent && !(0..=100).contains(&req.value) {
        return Err(ApiError::bad_request("percent value must be between 0 and 100"));
    }
    if req.kind == DiscountKind::Flat && req.value < 0 {
        return Err(ApiError::bad_request("flat value must not be negative"));
    }
    let coupon = Coupon {
        code: req.code,
        kind: req.kind,
        value: req.value,
        minimum_spend: Money::new(req.minimum_spend),
        expires_at: req.expires_at,
        usage_limit: req.usage_limit,
        usage_count: 0,
    };
    s.store.insert_coupon(coupon.clone())?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn get_coupon(
    State(s): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Coupon>, ApiError> {
    let coupon = s
        .store
        .get_coupon(&code)?
        .ok_or(CommerceError::CouponNotFound)?;
    Ok(Json(coupon))
}
