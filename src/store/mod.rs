//! Persistence layer.
//!
//! The backing store is an opaque document collection accessed by key, so
//! the rest of the crate talks to it through the repository traits below.
//! [`MemoryStore`] is the in-process implementation: one `RwLock`ed map per
//! collection, with coupon redemption done as a single guarded
//! read-modify-write under the write lock.
//!
//! [`CartStore`] and [`WishlistStore`] are the session-scoped components
//! handed to request handlers; every mutation writes the document back so
//! the cart survives a reload.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::aggregates::coupon::Coupon;
use crate::domain::aggregates::order::Order;
use crate::domain::aggregates::product::{Category, Product};
use crate::domain::aggregates::wishlist::Wishlist;
use crate::error::{CommerceError, Result};

pub trait ProductRepo: Send + Sync {
    fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
    fn list_products(&self) -> Result<Vec<Product>>;
    fn insert_product(&self, product: Product) -> Result<()>;
    /// Replaces an existing product; `ProductNotFound` when the id is unknown.
    fn update_product(&self, product: Product) -> Result<()>;
    fn delete_product(&self, id: Uuid) -> Result<()>;
}

pub trait CategoryRepo: Send + Sync {
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn insert_category(&self, category: Category) -> Result<()>;
}

pub trait CouponRepo: Send + Sync {
    fn get_coupon(&self, code: &str) -> Result<Option<Coupon>>;
    fn insert_coupon(&self, coupon: Coupon) -> Result<()>;
    /// Atomic check-then-increment of the usage count, guarded by the usage
    /// limit. Fails with `CouponRaceExhausted` when the increment would
    /// exceed the limit, so a limited coupon can never be over-redeemed by
    /// concurrent placements. Returns the remaining uses.
    fn redeem_coupon(&self, code: &str) -> Result<u32>;
    /// Compensating decrement for a redemption whose placement could not be
    /// persisted; a failed placement must not consume a use.
    fn release_coupon(&self, code: &str) -> Result<()>;
}

pub trait CartRepo: Send + Sync {
    /// An unknown user gets a fresh empty cart.
    fn load_cart(&self, user_id: Uuid) -> Result<Cart>;
    fn save_cart(&self, cart: Cart) -> Result<()>;
}

pub trait WishlistRepo: Send + Sync {
    fn load_wishlist(&self, user_id: Uuid) -> Result<Wishlist>;
    fn save_wishlist(&self, wishlist: Wishlist) -> Result<()>;
}

pub trait OrderRepo: Send + Sync {
    /// Returns `false` without writing when the id is already taken; the
    /// pipeline retries with a fresh suffix.
    fn insert_order(&self, order: Order) -> Result<bool>;
    fn get_order(&self, id: &str) -> Result<Option<Order>>;
    fn save_order(&self, order: Order) -> Result<()>;
    /// Most-recent-first, stable by creation timestamp.
    fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
}

#[derive(Default)]
pub struct MemoryStore {
    products: RwLock<Vec<Product>>,
    categories: RwLock<Vec<Category>>,
    coupons: RwLock<HashMap<String, Coupon>>,
    carts: RwLock<HashMap<Uuid, Cart>>,
    wishlists: RwLock<HashMap<Uuid, Wishlist>>,
    orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| CommerceError::Storage("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| CommerceError::Storage("store lock poisoned".into()))
}

impl ProductRepo for MemoryStore {
    fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(read(&self.products)?.iter().find(|p| p.id == id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        Ok(read(&self.products)?.clone())
    }

    fn insert_product(&self, product: Product) -> Result<()> {
        write(&self.products)?.push(product);
        Ok(())
    }

    fn update_product(&self, product: Product) -> Result<()> {
        let mut products = write(&self.products)?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(CommerceError::ProductNotFound)?;
        *slot = product;
        Ok(())
    }

    fn delete_product(&self, id: Uuid) -> Result<()> {
        write(&self.products)?.retain(|p| p.id != id);
        Ok(())
    }
}

impl CategoryRepo for MemoryStore {
    fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(read(&self.categories)?.clone())
    }

    fn insert_category(&self, category: Category) -> Result<()> {
        write(&self.categories)?.push(category);
        Ok(())
    }
}

impl CouponRepo for MemoryStore {
    fn get_coupon(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(read(&self.coupons)?.get(code).cloned())
    }

    fn insert_coupon(&self, coupon: Coupon) -> Result<()> {
        write(&self.coupons)?.insert(coupon.code.clone(), coupon);
        Ok(())
    }

    fn redeem_coupon(&self, code: &str) -> Result<u32> {
        let mut coupons = write(&self.coupons)?;
        let coupon = coupons.get_mut(code).ok_or(CommerceError::CouponNotFound)?;
        if coupon.is_exhausted() {
            return Err(CommerceError::CouponRaceExhausted);
        }
        coupon.usage_count += 1;
        Ok(coupon.usage_limit - coupon.usage_count)
    }

    fn release_coupon(&self, code: &str) -> Result<()> {
        let mut coupons = write(&self.coupons)?;
        let coupon = coupons.get_mut(code).ok_or(CommerceError::CouponNotFound)?;
        coupon.usage_count = coupon.usage_count.saturating_sub(1);
        Ok(())
    }
}

impl CartRepo for MemoryStore {
    fn load_cart(&self, user_id: Uuid) -> Result<Cart> {
        Ok(read(&self.carts)?
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Cart::new(user_id)))
    }

    fn save_cart(&self, cart: Cart) -> Result<()> {
        write(&self.carts)?.insert(cart.user_id(), cart);
        Ok(())
    }
}

impl WishlistRepo for MemoryStore {
    fn load_wishlist(&self, user_id: Uuid) -> Result<Wishlist> {
        Ok(read(&self.wishlists)?
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Wishlist::new(user_id)))
    }

    fn save_wishlist(&self, wishlist: Wishlist) -> Result<()> {
        write(&self.wishlists)?.insert(wishlist.user_id(), wishlist);
        Ok(())
    }
}

impl OrderRepo for MemoryStore {
    fn insert_order(&self, order: Order) -> Result<bool> {
        let mut orders = write(&self.orders)?;
        if orders.iter().any(|o| o.id() == order.id()) {
            return Ok(false);
        }
        orders.push(order);
        Ok(true)
    }

    fn get_order(&self, id: &str) -> Result<Option<Order>> {
        Ok(read(&self.orders)?.iter().find(|o| o.id() == id).cloned())
    }

    fn save_order(&self, order: Order) -> Result<()> {
        let mut orders = write(&self.orders)?;
        let slot = orders
            .iter_mut()
            .find(|o| o.id() == order.id())
            .ok_or(CommerceError::OrderNotFound)?;
        *slot = order;
        Ok(())
    }

    fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let mut result: Vec<Order> = read(&self.orders)?
            .iter()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        // Stable sort: ties keep insertion order.
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(result)
    }
}

/// Session-scoped cart component. Every operation loads the owner's cart,
/// applies the change through the aggregate and writes it back.
pub struct CartStore {
    repo: Arc<dyn CartRepo>,
    user_id: Uuid,
}

impl CartStore {
    pub fn new(repo: Arc<dyn CartRepo>, user_id: Uuid) -> Self {
        Self { repo, user_id }
    }

    pub fn cart(&self) -> Result<Cart> {
        self.repo.load_cart(self.user_id)
    }

    /// Adds a line, snapshotting the product's current prices. Merges into
    /// an existing (product, size) line.
    pub fn add_item(&self, product: &Product, size: Option<String>, quantity: u32) -> Result<Cart> {
        let mut cart = self.cart()?;
        cart.add_line(product.id, size, quantity, product.price, product.original_price)?;
        self.repo.save_cart(cart.clone())?;
        Ok(cart)
    }

    pub fn update_quantity(&self, product_id: Uuid, size: Option<&str>, quantity: u32) -> Result<Cart> {
        let mut cart = self.cart()?;
        cart.update_quantity(product_id, size, quantity)?;
        self.repo.save_cart(cart.clone())?;
        Ok(cart)
    }

    pub fn remove_item(&self, product_id: Uuid, size: Option<&str>) -> Result<Cart> {
        let mut cart = self.cart()?;
        cart.remove_line(product_id, size);
        self.repo.save_cart(cart.clone())?;
        Ok(cart)
    }

    pub fn clear(&self) -> Result<()> {
        let mut cart = self.cart()?;
        cart.clear();
        self.repo.save_cart(cart)
    }

    pub fn snapshot(&self) -> Result<Vec<CartLine>> {
        Ok(self.cart()?.snapshot())
    }
}

/// Session-scoped wishlist component, same load-mutate-save shape as
/// [`CartStore`].
pub struct WishlistStore {
    repo: Arc<dyn WishlistRepo>,
    user_id: Uuid,
}

impl WishlistStore {
    pub fn new(repo: Arc<dyn WishlistRepo>, user_id: Uuid) -> Self {
        Self { repo, user_id }
    }

    pub fn toggle(&self, product_id: Uuid) -> Result<bool> {
        let mut wishlist = self.repo.load_wishlist(self.user_id)?;
        let in_wishlist = wishlist.toggle(product_id);
        self.repo.save_wishlist(wishlist)?;
        Ok(in_wishlist)
    }

    pub fn contains(&self, product_id: Uuid) -> Result<bool> {
        Ok(self.repo.load_wishlist(self.user_id)?.contains(product_id))
    }

    pub fn list(&self) -> Result<Vec<Uuid>> {
        Ok(self.repo.load_wishlist(self.user_id)?.list().to_vec())
    }
}
