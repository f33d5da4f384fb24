//! Integration tests for TechMart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p techmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout` - Stock accounting across catalog, carts and orders
//! - `order_lifecycle` - Status transitions and reorder
//! - `storefront_api` - HTTP routes served on an ephemeral port
//!
//! Nothing here needs external services; every test builds its own shop.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use argon2::Params;
use reqwest::Client;

use techmart_core::{Email, Price, ProductId};
use techmart_ledger::accounts::BOOTSTRAP_ADMIN_EMAIL;
use techmart_ledger::{Accounts, NewProduct, Shop, ShopError};
use techmart_storefront::config::StorefrontConfig;
use techmart_storefront::state::AppState;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// The bootstrap admin address.
///
/// # Errors
///
/// Never fails for the built-in address.
pub fn admin_email() -> Result<Email, ShopError> {
    Ok(Email::parse(BOOTSTRAP_ADMIN_EMAIL)?)
}

/// An empty shop that hashes passwords with minimal Argon2 cost.
///
/// # Errors
///
/// Returns an error if the hashing parameters are rejected.
pub fn test_shop() -> Result<Shop, Box<dyn std::error::Error>> {
    let params = Params::new(8, 1, 1, None).map_err(|e| e.to_string())?;
    Ok(Shop::new(Accounts::with_params(admin_email()?, params)))
}

/// Add a product with the given price in cents and stock.
///
/// # Errors
///
/// Returns the catalog error if the product cannot be created.
pub fn add_product(shop: &Shop, name: &str, cents: u32, stock: u32) -> Result<ProductId, ShopError> {
    Ok(shop
        .catalog()
        .create(NewProduct {
            name: name.to_string(),
            price: Price::from_cents(cents),
            stock,
            ..NewProduct::default()
        })?
        .id)
}

/// A storefront served on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shop: Shop,
}

impl TestServer {
    /// Serve `shop` on `127.0.0.1:0` in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(shop: Shop) -> std::io::Result<Self> {
        let config = StorefrontConfig::new(shop.accounts().bootstrap_admin().clone());
        let app = techmart_storefront::app(AppState::with_shop(config, shop.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, shop })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A fresh client with its own cookie jar (one browser session).
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self) -> reqwest::Result<Client> {
        Client::builder().cookie_store(true).build()
    }
}
