//! Application state shared across handlers.

use std::sync::Arc;

use techmart_ledger::{Accounts, Shop};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the shop stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: Shop,
}

impl AppState {
    /// Create application state with an empty shop.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let accounts = Accounts::new(config.bootstrap_admin.clone());
        Self::with_shop(config, Shop::new(accounts))
    }

    /// Create application state around an existing shop.
    #[must_use]
    pub fn with_shop(config: StorefrontConfig, shop: Shop) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, shop }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shop stores.
    #[must_use]
    pub fn shop(&self) -> &Shop {
        &self.inner.shop
    }
}
