//! The store bundle handed to the presentation layer.

use tracing::{info, instrument};

use techmart_core::Email;

use crate::Result;
use crate::accounts::Accounts;
use crate::analytics::{Dashboard, UserStats};
use crate::cart::Carts;
use crate::catalog::Catalog;
use crate::orders::Orders;
use crate::seed;

/// One instance of each store, wired together.
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Debug, Clone)]
pub struct Shop {
    catalog: Catalog,
    carts: Carts,
    orders: Orders,
    accounts: Accounts,
}

impl Shop {
    /// Create an empty shop around an account store.
    #[must_use]
    pub fn new(accounts: Accounts) -> Self {
        let catalog = Catalog::new();
        let carts = Carts::new(catalog.clone());
        let orders = Orders::new(catalog.clone(), carts.clone());
        Self {
            catalog,
            carts,
            orders,
            accounts,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn carts(&self) -> &Carts {
        &self.carts
    }

    #[must_use]
    pub const fn orders(&self) -> &Orders {
        &self.orders
    }

    #[must_use]
    pub const fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Load the demo products into the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::AlreadyExists` if a demo id is already taken.
    #[instrument(skip(self))]
    pub fn seed_demo_catalog(&self) -> Result<usize> {
        let products = seed::demo_products();
        let count = products.len();
        for product in products {
            self.catalog.create(product)?;
        }
        info!(count, "demo catalog loaded");
        Ok(count)
    }

    /// Admin dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if a store is unusable.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let products = self.catalog.snapshot()?;
        let orders = self.orders.list_all()?;
        let account_count = self.accounts.count()?;
        Ok(Dashboard::compute(&products, &orders, account_count))
    }

    /// Order figures for one user.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if a store is unusable.
    pub fn user_stats(&self, user: &Email) -> Result<UserStats> {
        Ok(UserStats::compute(&self.orders.list_for_user(user)?))
    }
}
