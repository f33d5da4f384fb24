//! Order ledger.
//!
//! Orders are created from a cart snapshot at checkout and are never
//! deleted. After creation only `status` changes, following the
//! [`OrderStatus`] state machine. Checkout takes stock out of the catalog;
//! cancellation puts it back.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use techmart_core::{Email, OrderId, OrderStatus, Price, ProductId};

use crate::Result;
use crate::cart::{self, Carts};
use crate::catalog::Catalog;
use crate::error::{self, EntityKind, ShopError};

const STORE: &str = "orders";

/// Days between order placement and estimated delivery.
pub const DELIVERY_ESTIMATE_DAYS: i64 = 7;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user: Email,
    /// Quantities ordered, fixed at checkout.
    pub items: BTreeMap<ProductId, u32>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
}

impl Order {
    /// Total units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.values().sum()
    }

    /// Whether the order still holds stock (anything but cancelled).
    #[must_use]
    pub fn holds_stock(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }
}

/// What a reorder put into the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorderOutcome {
    /// `(product, quantity)` pairs added to the cart.
    pub added: Vec<(ProductId, u32)>,
    /// Products from the order that are no longer sold.
    pub skipped: Vec<ProductId>,
}

/// The order ledger.
#[derive(Debug, Clone)]
pub struct Orders {
    catalog: Catalog,
    carts: Carts,
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl Orders {
    /// Create an empty ledger over the given catalog and carts.
    #[must_use]
    pub fn new(catalog: Catalog, carts: Carts) -> Self {
        Self {
            catalog,
            carts,
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Turn the user's cart into a `Pending` order.
    ///
    /// Stock for every line is taken in one all-or-nothing step; on failure
    /// no stock changes, no order is created and the cart is untouched.
    /// Entries for products deleted since they were added are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::EmptyCart` if the cart has nothing orderable and
    /// `ShopError::InsufficientStock` if any line exceeds current stock.
    #[instrument(skip(self))]
    pub fn checkout(&self, user: &Email) -> Result<Order> {
        let mut entries = self.carts.lock()?;
        let lines = cart::lines_in(&entries, user);
        if lines.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let reservation = self.catalog.reserve(&lines)?;
        if !reservation.skipped.is_empty() {
            warn!(skipped = ?reservation.skipped, "dropping cart entries for deleted products");
        }
        if reservation.items.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let created_at = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user: user.clone(),
            items: reservation.items,
            total: reservation.total,
            status: OrderStatus::Pending,
            created_at,
            estimated_delivery: created_at + Duration::days(DELIVERY_ESTIMATE_DAYS),
        };

        match error::write(&self.orders, STORE) {
            Ok(mut orders) => {
                orders.insert(order.id, order.clone());
            }
            Err(e) => {
                self.catalog.restock(&order.items)?;
                return Err(e);
            }
        }
        cart::clear_in(&mut entries, user);

        info!(
            order_id = %order.id,
            total = %order.total,
            items = order.item_count(),
            "order placed"
        );
        Ok(order)
    }

    /// Move an order to `next`.
    ///
    /// A request for `Cancelled` is handled by [`Orders::cancel`] so that
    /// stock is restored.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the order is unknown and
    /// `ShopError::InvalidTransition` if `next` is not reachable.
    #[instrument(skip(self))]
    pub fn advance_status(&self, id: OrderId, next: OrderStatus) -> Result<Order> {
        if next == OrderStatus::Cancelled {
            return self.cancel(id);
        }

        let mut orders = error::write(&self.orders, STORE)?;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found(EntityKind::Order, id))?;

        if !order.status.can_transition_to(next) {
            return Err(ShopError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let from = order.status;
        order.status = next;
        info!(order_id = %id, %from, to = %next, "order status changed");
        Ok(order.clone())
    }

    /// Cancel an order and put its items back into stock.
    ///
    /// Items whose product has since been deleted are not restocked.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the order is unknown and
    /// `ShopError::InvalidTransition` unless the order is `Pending` or
    /// `Processing`.
    #[instrument(skip(self))]
    pub fn cancel(&self, id: OrderId) -> Result<Order> {
        let mut orders = error::write(&self.orders, STORE)?;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found(EntityKind::Order, id))?;

        if !order.status.is_cancellable() {
            return Err(ShopError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let skipped = self.catalog.restock(&order.items)?;
        if !skipped.is_empty() {
            warn!(?skipped, "products no longer in catalog were not restocked");
        }

        order.status = OrderStatus::Cancelled;
        info!(order_id = %id, "order cancelled");
        Ok(order.clone())
    }

    /// Put the items of a past order back into the user's cart.
    ///
    /// Quantities are checked against current stock exactly like
    /// [`Carts::add_item`]; if any line fails, the cart is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the order is unknown or belongs to
    /// another user, and `ShopError::InsufficientStock` if a line exceeds
    /// current stock.
    #[instrument(skip(self))]
    pub fn reorder(&self, user: &Email, id: OrderId) -> Result<ReorderOutcome> {
        let order = self.get(id)?;
        if &order.user != user {
            return Err(ShopError::not_found(EntityKind::Order, id));
        }

        let (added, skipped) = self.carts.add_all(user, &order.items)?;
        info!(order_id = %id, added = added.len(), skipped = skipped.len(), "order re-added to cart");
        Ok(ReorderOutcome { added, skipped })
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the order is unknown.
    pub fn get(&self, id: OrderId) -> Result<Order> {
        error::read(&self.orders, STORE)?
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::not_found(EntityKind::Order, id))
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn list_for_user(&self, user: &Email) -> Result<Vec<Order>> {
        self.collect(|order| &order.user == user)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn list_all(&self) -> Result<Vec<Order>> {
        self.collect(|_| true)
    }

    /// Number of orders in each status. Statuses with no orders are omitted.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn status_counts(&self) -> Result<BTreeMap<OrderStatus, usize>> {
        let mut counts = BTreeMap::new();
        for order in error::read(&self.orders, STORE)?.values() {
            *counts.entry(order.status).or_default() += 1;
        }
        Ok(counts)
    }

    fn collect(&self, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = error::read(&self.orders, STORE)?
            .values()
            .filter(|order| keep(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }
}
