//! Environment-driven configuration.

use crate::domain::value_objects::Money;

/// Shipping/pricing knobs. These are configuration inputs, not rules baked
/// into the pricing engine.
#[derive(Clone, Copy, Debug)]
pub struct PricingConfig {
    /// Orders at or above this subtotal ship free.
    pub free_shipping_threshold: Money,
    /// Flat fee charged below the threshold.
    pub shipping_flat_fee: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::new(999),
            shipping_flat_fee: Money::new(99),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Reads `PORT`, `FREE_SHIPPING_THRESHOLD` and `SHIPPING_FLAT_FEE` from
    /// the environment, falling back to the storefront defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8083);
        let mut pricing = PricingConfig::default();
        if let Some(threshold) = env_amount("FREE_SHIPPING_THRESHOLD") {
            pricing.free_shipping_threshold = threshold;
        }
        if let Some(fee) = env_amount("SHIPPING_FLAT_FEE") {
            pricing.shipping_flat_fee = fee;
        }
        Self { port, pricing }
    }
}

fn env_amount(key: &str) -> Option<Money> {
    std::env::var(key).ok()?.parse::<i64>().ok().map(Money::new)
}
