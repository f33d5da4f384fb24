//! Ledger error types.
//!
//! Every variant is a local validation failure except `PasswordHash` and
//! `LockPoisoned`, which indicate a broken process. A failed operation never
//! leaves partial changes behind.

use std::fmt;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use techmart_core::{EmailError, OrderStatus, ProductId};

/// Kind of record named in a `NotFound` or `AlreadyExists` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    CartEntry,
    Order,
    Account,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Product => "product",
            Self::CartEntry => "cart entry",
            Self::Order => "order",
            Self::Account => "account",
        })
    }
}

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// The referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of record was looked up.
        kind: EntityKind,
        /// The id that was looked up.
        id: String,
    },

    /// Not enough stock to satisfy the request.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product whose stock ran out.
        product_id: ProductId,
        /// Quantity that was asked for.
        requested: u64,
        /// Stock on hand at the time of the request.
        available: u32,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The requested status is not reachable from the current one.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// A record with the same id already exists.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// What kind of record collided.
        kind: EntityKind,
        /// The colliding id.
        id: String,
    },

    /// The operation is not permitted.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// A store lock was poisoned by a panicking writer.
    #[error("{0} store lock poisoned")]
    LockPoisoned(&'static str),
}

impl ShopError {
    pub(crate) fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this error indicates a broken process rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::PasswordHash | Self::LockPoisoned(_))
    }
}

pub(crate) fn read<'a, T>(
    lock: &'a RwLock<T>,
    store: &'static str,
) -> Result<RwLockReadGuard<'a, T>, ShopError> {
    lock.read().map_err(|_| ShopError::LockPoisoned(store))
}

pub(crate) fn write<'a, T>(
    lock: &'a RwLock<T>,
    store: &'static str,
) -> Result<RwLockWriteGuard<'a, T>, ShopError> {
    lock.write().map_err(|_| ShopError::LockPoisoned(store))
}

pub(crate) fn lock<'a, T>(
    lock: &'a Mutex<T>,
    store: &'static str,
) -> Result<MutexGuard<'a, T>, ShopError> {
    lock.lock().map_err(|_| ShopError::LockPoisoned(store))
}
