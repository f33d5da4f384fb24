//! TechMart Ledger - catalog, cart, order and account stores.
//!
//! All state is in memory and lives as long as the [`Shop`] that owns it.
//! The stores are cheaply cloneable handles onto shared state, so the
//! presentation layer can hand them to request handlers freely.
//!
//! # Modules
//!
//! - [`catalog`] - Products and stock levels (source of truth for price and stock)
//! - [`cart`] - Per-user carts keyed by `(user, product)`
//! - [`orders`] - Checkout and the order status state machine
//! - [`accounts`] - Credentials and the admin flag
//! - [`analytics`] - Read-only aggregates for the admin dashboard
//! - [`seed`] - Demo catalog
//!
//! # Lock order
//!
//! The cart lock is taken before the orders lock, and the catalog lock is
//! never held while another store's lock is acquired. Checkout holds the
//! cart lock across the whole operation, so it is atomic with respect to
//! the user's own cart. The catalog's `reserve` takes and releases the
//! catalog lock before the order is recorded, which makes checkout atomic
//! with respect to other users' checkouts.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod accounts;
pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod orders;
pub mod seed;
pub mod shop;

pub use accounts::{Account, Accounts};
pub use analytics::{Dashboard, UserStats};
pub use cart::{CartLine, CartSummary, Carts};
pub use catalog::{Catalog, NewProduct, Product, ProductQuery, ProductSort, ProductUpdate};
pub use error::{EntityKind, ShopError};
pub use orders::{Order, Orders, ReorderOutcome};
pub use shop::Shop;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, ShopError>;
