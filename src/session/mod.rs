pub mod checkout;
pub mod location;
pub mod slot;
pub mod store;

pub use checkout::{CheckoutProgress, CheckoutStep};
pub use location::{delivery_window, DeliveryWindow, LocationPreference};
pub use slot::SessionSlot;
pub use store::{FileStore, MemoryStore, SessionStore};

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::domain::cart::Cart;
use crate::error::SessionError;

/// Builds the namespaced document key one feature's state lives under.
pub fn storage_key(slug: &str, feature: &str) -> String {
    format!("{}-{}-storage", slug, feature)
}

/// All per-shopper state for one storefront, loaded once per session.
/// Each feature owns its slot; nothing here is global.
pub struct StorefrontSession {
    pub cart: SessionSlot<Cart>,
    pub checkout: SessionSlot<CheckoutProgress>,
    pub location: SessionSlot<LocationPreference>,
}

impl StorefrontSession {
    pub fn open(
        config: &StorefrontConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, SessionError> {
        let slug = &config.store_slug;

        Ok(StorefrontSession {
            cart: SessionSlot::open(Arc::clone(&store), storage_key(slug, "cart"))?,
            checkout: SessionSlot::open(Arc::clone(&store), storage_key(slug, "checkout"))?,
            location: SessionSlot::open(store, storage_key(slug, "location"))?,
        })
    }
}
