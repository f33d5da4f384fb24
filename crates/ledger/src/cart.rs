//! Cart store.
//!
//! Carts are keyed by `(user, product)`. A user only ever sees their own
//! entries. Quantities are validated against catalog stock on every add or
//! update, but stock is not held: it is only taken at checkout.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, instrument};

use techmart_core::{Email, Price, ProductId};

use crate::Result;
use crate::catalog::Catalog;
use crate::error::{self, EntityKind, ShopError};

const STORE: &str = "cart";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CartKey {
    user: Email,
    product: ProductId,
}

impl CartKey {
    fn new(user: &Email, product: &ProductId) -> Self {
        Self {
            user: user.clone(),
            product: product.clone(),
        }
    }
}

pub(crate) type CartEntries = HashMap<CartKey, u32>;

/// One cart line, priced at the current catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
    /// Stock on hand right now; checkout fails if this drops below `quantity`.
    pub available: u32,
}

/// A user's cart with its total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub item_count: u32,
}

/// Per-user shopping carts.
#[derive(Debug, Clone)]
pub struct Carts {
    catalog: Catalog,
    entries: Arc<Mutex<CartEntries>>,
}

impl Carts {
    /// Create an empty cart store reading prices and stock from `catalog`.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add `qty` units of a product to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the product is unknown,
    /// `ShopError::Invalid` if `qty` is zero, and
    /// `ShopError::InsufficientStock` if the resulting quantity would exceed
    /// the current stock.
    #[instrument(skip(self))]
    pub fn add_item(&self, user: &Email, product: &ProductId, qty: u32) -> Result<u32> {
        if qty == 0 {
            return Err(ShopError::Invalid("quantity must be at least 1".to_owned()));
        }

        let mut entries = self.lock()?;
        let key = CartKey::new(user, product);
        let current = entries.get(&key).copied().unwrap_or(0);
        let next = current
            .checked_add(qty)
            .ok_or_else(|| ShopError::Invalid("quantity too large".to_owned()))?;

        self.check_stock(product, next)?;
        entries.insert(key, next);

        debug!(quantity = next, "cart entry updated");
        Ok(next)
    }

    /// Replace the quantity of a product in the user's cart. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the product is unknown (a zero
    /// quantity still removes an entry whose product was deleted) and
    /// `ShopError::InsufficientStock` if `qty` exceeds the current stock.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, user: &Email, product: &ProductId, qty: u32) -> Result<()> {
        let mut entries = self.lock()?;
        let key = CartKey::new(user, product);

        if qty == 0 {
            if entries.remove(&key).is_none() {
                self.catalog.get(product)?;
            }
            return Ok(());
        }

        self.check_stock(product, qty)?;
        entries.insert(key, qty);
        Ok(())
    }

    /// Remove a product from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the cart has no such entry.
    #[instrument(skip(self))]
    pub fn remove_item(&self, user: &Email, product: &ProductId) -> Result<()> {
        self.lock()?
            .remove(&CartKey::new(user, product))
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found(EntityKind::CartEntry, product))
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    #[instrument(skip(self))]
    pub fn clear(&self, user: &Email) -> Result<()> {
        let removed = clear_in(&mut *self.lock()?, user);
        info!(removed, "cart cleared");
        Ok(())
    }

    /// Σ quantity × current price, skipping products no longer in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if a store is unusable.
    pub fn total(&self, user: &Email) -> Result<Price> {
        Ok(self.list(user)?.iter().map(|line| line.line_total).sum())
    }

    /// The user's cart lines, in product id order.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if a store is unusable.
    pub fn list(&self, user: &Email) -> Result<Vec<CartLine>> {
        let lines = lines_in(&*self.lock()?, user);
        self.price_lines(lines)
    }

    /// Lines, total and item count in one read.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if a store is unusable.
    pub fn summary(&self, user: &Email) -> Result<CartSummary> {
        let lines = self.list(user)?;
        Ok(CartSummary {
            total: lines.iter().map(|line| line.line_total).sum(),
            item_count: lines.iter().map(|line| line.quantity).sum(),
            lines,
        })
    }

    /// Total units in the user's cart, including entries for deleted products.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn item_count(&self, user: &Email) -> Result<u32> {
        Ok(lines_in(&*self.lock()?, user)
            .iter()
            .map(|(_, qty)| *qty)
            .sum())
    }

    /// Add every line to the user's cart, or none of them.
    ///
    /// Lines for products no longer in the catalog are skipped and returned.
    pub(crate) fn add_all(
        &self,
        user: &Email,
        items: &BTreeMap<ProductId, u32>,
    ) -> Result<(Vec<(ProductId, u32)>, Vec<ProductId>)> {
        let mut entries = self.lock()?;
        let products = self.catalog.snapshot_of(items.keys().cloned())?;

        let mut planned = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();

        for (product, qty) in items {
            let Some(available) = products.get(product).map(|p| p.stock) else {
                skipped.push(product.clone());
                continue;
            };
            let current = entries
                .get(&CartKey::new(user, product))
                .copied()
                .unwrap_or(0);
            let next = current.saturating_add(*qty);
            if next > available {
                return Err(ShopError::InsufficientStock {
                    product_id: product.clone(),
                    requested: u64::from(next),
                    available,
                });
            }
            planned.push((product.clone(), next));
        }

        for (product, next) in &planned {
            entries.insert(CartKey::new(user, product), *next);
        }
        let added = items
            .iter()
            .filter(|(product, _)| !skipped.contains(*product))
            .map(|(product, qty)| (product.clone(), *qty))
            .collect();
        Ok((added, skipped))
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, CartEntries>> {
        error::lock(&self.entries, STORE)
    }

    fn check_stock(&self, product: &ProductId, wanted: u32) -> Result<()> {
        let available = self.catalog.get(product)?.stock;
        if wanted > available {
            return Err(ShopError::InsufficientStock {
                product_id: product.clone(),
                requested: u64::from(wanted),
                available,
            });
        }
        Ok(())
    }

    fn price_lines(&self, lines: Vec<(ProductId, u32)>) -> Result<Vec<CartLine>> {
        let catalog = self.catalog.snapshot_of(lines.iter().map(|(id, _)| id.clone()))?;
        Ok(lines
            .into_iter()
            .filter_map(|(product_id, quantity)| {
                let product = catalog.get(&product_id)?;
                Some(CartLine {
                    name: product.name.clone(),
                    unit_price: product.price,
                    line_total: product.price * quantity,
                    available: product.stock,
                    product_id,
                    quantity,
                })
            })
            .collect())
    }
}

/// The user's `(product, quantity)` pairs from a locked entry map, in id order.
pub(crate) fn lines_in(entries: &CartEntries, user: &Email) -> Vec<(ProductId, u32)> {
    let mut lines: Vec<(ProductId, u32)> = entries
        .iter()
        .filter(|(key, _)| &key.user == user)
        .map(|(key, qty)| (key.product.clone(), *qty))
        .collect();
    lines.sort();
    lines
}

/// Remove all of the user's entries from a locked entry map.
pub(crate) fn clear_in(entries: &mut CartEntries, user: &Email) -> usize {
    let before = entries.len();
    entries.retain(|key, _| &key.user != user);
    before - entries.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::NewProduct;

    fn setup() -> (Catalog, Carts, ProductId, ProductId) {
        let catalog = Catalog::new();
        let a = catalog
            .create(NewProduct {
                name: "Jeans".to_owned(),
                price: Price::from_cents(6_999),
                stock: 5,
                ..NewProduct::default()
            })
            .unwrap();
        let b = catalog
            .create(NewProduct {
                name: "Camera".to_owned(),
                price: Price::from_cents(1_000),
                stock: 2,
                ..NewProduct::default()
            })
            .unwrap();
        (catalog.clone(), Carts::new(catalog), a.id, b.id)
    }

    fn user(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_add_item_accumulates() {
        let (_, carts, a, _) = setup();
        let alice = user("alice@example.com");

        assert_eq!(carts.add_item(&alice, &a, 2).unwrap(), 2);
        assert_eq!(carts.add_item(&alice, &a, 1).unwrap(), 3);
        assert_eq!(carts.item_count(&alice).unwrap(), 3);
    }

    #[test]
    fn test_add_item_validates_against_stock() {
        let (_, carts, a, b) = setup();
        let alice = user("alice@example.com");

        assert!(matches!(
            carts.add_item(&alice, &b, 3),
            Err(ShopError::InsufficientStock { available: 2, .. })
        ));

        carts.add_item(&alice, &a, 4).unwrap();
        assert!(matches!(
            carts.add_item(&alice, &a, 2),
            Err(ShopError::InsufficientStock {
                requested: 6,
                available: 5,
                ..
            })
        ));
        assert_eq!(carts.item_count(&alice).unwrap(), 4);
    }

    #[test]
    fn test_add_item_rejects_unknown_and_zero() {
        let (_, carts, a, _) = setup();
        let alice = user("alice@example.com");

        assert!(matches!(
            carts.add_item(&alice, &ProductId::from_sequence(99), 1),
            Err(ShopError::NotFound { .. })
        ));
        assert!(matches!(
            carts.add_item(&alice, &a, 0),
            Err(ShopError::Invalid(_))
        ));
    }

    #[test]
    fn test_set_quantity_replaces_and_zero_removes() {
        let (_, carts, a, _) = setup();
        let alice = user("alice@example.com");

        carts.add_item(&alice, &a, 1).unwrap();
        carts.set_quantity(&alice, &a, 4).unwrap();
        assert_eq!(carts.item_count(&alice).unwrap(), 4);

        assert!(matches!(
            carts.set_quantity(&alice, &a, 6),
            Err(ShopError::InsufficientStock { .. })
        ));
        assert_eq!(carts.item_count(&alice).unwrap(), 4);

        carts.set_quantity(&alice, &a, 0).unwrap();
        assert!(carts.list(&alice).unwrap().is_empty());
    }

    #[test]
    fn test_set_quantity_zero_rejects_unknown_product() {
        let (catalog, carts, a, b) = setup();
        let alice = user("alice@example.com");

        assert!(matches!(
            carts.set_quantity(&alice, &ProductId::from_sequence(99), 0),
            Err(ShopError::NotFound {
                kind: EntityKind::Product,
                ..
            })
        ));

        // Known product, nothing in the cart: nothing to do.
        carts.set_quantity(&alice, &a, 0).unwrap();

        carts.add_item(&alice, &b, 1).unwrap();
        catalog.delete(&b).unwrap();
        carts.set_quantity(&alice, &b, 0).unwrap();
        assert_eq!(carts.item_count(&alice).unwrap(), 0);
    }

    #[test]
    fn test_remove_item() {
        let (_, carts, a, b) = setup();
        let alice = user("alice@example.com");

        carts.add_item(&alice, &a, 1).unwrap();
        carts.remove_item(&alice, &a).unwrap();
        assert!(matches!(
            carts.remove_item(&alice, &b),
            Err(ShopError::NotFound {
                kind: EntityKind::CartEntry,
                ..
            })
        ));
    }

    #[test]
    fn test_total_uses_current_price_and_skips_deleted() {
        let (catalog, carts, a, b) = setup();
        let alice = user("alice@example.com");

        carts.add_item(&alice, &a, 2).unwrap();
        carts.add_item(&alice, &b, 1).unwrap();
        assert_eq!(carts.total(&alice).unwrap(), Price::from_cents(14_998));

        catalog.delete(&b).unwrap();
        assert_eq!(carts.total(&alice).unwrap(), Price::from_cents(13_998));
        assert_eq!(carts.list(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_carts_are_private_per_user() {
        let (_, carts, a, _) = setup();
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");

        carts.add_item(&alice, &a, 2).unwrap();
        carts.add_item(&bob, &a, 3).unwrap();
        carts.clear(&alice).unwrap();

        assert!(carts.list(&alice).unwrap().is_empty());
        assert_eq!(carts.item_count(&bob).unwrap(), 3);
    }

    #[test]
    fn test_summary() {
        let (_, carts, a, b) = setup();
        let alice = user("alice@example.com");

        carts.add_item(&alice, &a, 1).unwrap();
        carts.add_item(&alice, &b, 2).unwrap();

        let summary = carts.summary(&alice).unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, Price::from_cents(8_999));
        assert_eq!(summary.lines[0].product_id, a);
        assert_eq!(summary.lines[1].line_total, Price::from_cents(2_000));
    }
}
