//! Catalog store.
//!
//! Holds every product record and is the source of truth for price and
//! stock. Stock is the only contended resource in the shop: every stock
//! mutation happens under the catalog's write lock, and multi-product
//! decrements go through [`Catalog::reserve`], which is all-or-nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use techmart_core::{Category, Price, ProductId};

use crate::Result;
use crate::error::{self, EntityKind, ShopError};

const STORE: &str = "catalog";

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Category,
    pub stock: u32,
    pub rating: f32,
    pub reviews_count: u32,
    pub specs: Vec<String>,
}

impl Product {
    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Input for creating a product.
///
/// When `id` is omitted the catalog assigns the next free `P###` id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub specs: Vec<String>,
}

/// Partial update of a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<Category>,
    pub stock: Option<u32>,
    pub rating: Option<f32>,
    pub specs: Option<Vec<String>>,
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Rating,
}

/// Filter and sort options for [`Catalog::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name and description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|c| c != product.category) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
        }
    }
}

/// Result of a successful [`Catalog::reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Quantities taken out of stock.
    pub items: BTreeMap<ProductId, u32>,
    /// Σ quantity × price, priced under the same lock as the decrement.
    pub total: Price,
    /// Requested products that no longer exist in the catalog.
    pub skipped: Vec<ProductId>,
}

#[derive(Debug, Default)]
struct CatalogState {
    products: BTreeMap<ProductId, Product>,
    next_sequence: u32,
}

impl CatalogState {
    /// Apply a signed stock delta to one product.
    fn adjust(&mut self, id: &ProductId, delta: i64) -> Result<u32> {
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found(EntityKind::Product, id))?;

        let next = i64::from(product.stock)
            .checked_add(delta)
            .ok_or_else(|| ShopError::Invalid(format!("stock for {id} would overflow")))?;
        if next < 0 {
            return Err(ShopError::InsufficientStock {
                product_id: id.clone(),
                requested: delta.unsigned_abs(),
                available: product.stock,
            });
        }
        product.stock = u32::try_from(next)
            .map_err(|_| ShopError::Invalid(format!("stock for {id} would overflow")))?;
        Ok(product.stock)
    }

    fn assign_id(&mut self, requested: Option<ProductId>) -> ProductId {
        if let Some(id) = requested {
            return id;
        }
        loop {
            self.next_sequence += 1;
            let id = ProductId::from_sequence(self.next_sequence);
            if !self.products.contains_key(&id) {
                return id;
            }
        }
    }

    fn note_id(&mut self, id: &ProductId) {
        if let Some(seq) = id.sequence() {
            self.next_sequence = self.next_sequence.max(seq);
        }
    }
}

/// The product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogState>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the id is unknown.
    pub fn get(&self, id: &ProductId) -> Result<Product> {
        error::read(&self.inner, STORE)?
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found(EntityKind::Product, id))
    }

    /// List products matching `query`, in the requested order.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn list(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = error::read(&self.inner, STORE)?
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();

        match query.sort {
            ProductSort::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
            ProductSort::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
            ProductSort::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSort::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
        Ok(products)
    }

    /// Distinct categories of the products currently in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn categories(&self) -> Result<Vec<Category>> {
        let categories: BTreeSet<Category> = error::read(&self.inner, STORE)?
            .products
            .values()
            .map(|p| p.category)
            .collect();
        Ok(categories.into_iter().collect())
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn len(&self) -> Result<usize> {
        Ok(error::read(&self.inner, STORE)?.products.len())
    }

    /// Whether the catalog has no products.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::AlreadyExists` if the id is taken and
    /// `ShopError::Invalid` if the name is blank or the rating is out of range.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn create(&self, new: NewProduct) -> Result<Product> {
        validate_name(&new.name)?;
        validate_rating(new.rating)?;

        let mut state = error::write(&self.inner, STORE)?;
        if let Some(id) = &new.id
            && state.products.contains_key(id)
        {
            return Err(ShopError::already_exists(EntityKind::Product, id));
        }

        let id = state.assign_id(new.id);
        state.note_id(&id);

        let product = Product {
            id: id.clone(),
            name: new.name.trim().to_owned(),
            description: new.description,
            price: new.price,
            category: new.category,
            stock: new.stock,
            rating: new.rating,
            reviews_count: new.reviews_count,
            specs: new.specs,
        };
        state.products.insert(id.clone(), product.clone());

        info!(product_id = %id, stock = product.stock, "product created");
        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the id is unknown and
    /// `ShopError::Invalid` if a new name or rating fails validation.
    #[instrument(skip(self, update))]
    pub fn update(&self, id: &ProductId, update: ProductUpdate) -> Result<Product> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(rating) = update.rating {
            validate_rating(rating)?;
        }

        let mut state = error::write(&self.inner, STORE)?;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found(EntityKind::Product, id))?;

        if let Some(name) = update.name {
            product.name = name.trim().to_owned();
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        if let Some(rating) = update.rating {
            product.rating = rating;
        }
        if let Some(specs) = update.specs {
            product.specs = specs;
        }

        info!(product_id = %id, "product updated");
        Ok(product.clone())
    }

    /// Remove a product.
    ///
    /// Orders keep their item snapshots; carts skip the missing product.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &ProductId) -> Result<Product> {
        let removed = error::write(&self.inner, STORE)?
            .products
            .remove(id)
            .ok_or_else(|| ShopError::not_found(EntityKind::Product, id))?;

        info!(product_id = %id, "product deleted");
        Ok(removed)
    }

    /// Apply a signed delta to a product's stock and return the new stock.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the id is unknown and
    /// `ShopError::InsufficientStock` if the stock would go negative, in
    /// which case the stock is left unchanged.
    #[instrument(skip(self))]
    pub fn adjust_stock(&self, id: &ProductId, delta: i64) -> Result<u32> {
        error::write(&self.inner, STORE)?.adjust(id, delta)
    }

    /// Overwrite a product's stock level (admin stock edit).
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub fn set_stock(&self, id: &ProductId, stock: u32) -> Result<Product> {
        self.update(
            id,
            ProductUpdate {
                stock: Some(stock),
                ..ProductUpdate::default()
            },
        )
    }

    /// Take `lines` out of stock as one atomic step.
    ///
    /// Lines naming products that no longer exist are skipped and reported.
    /// If any remaining line cannot be satisfied, every decrement already
    /// applied by this call is rolled back before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InsufficientStock` for the first line that cannot
    /// be satisfied.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn reserve(&self, lines: &[(ProductId, u32)]) -> Result<Reservation> {
        let mut state = error::write(&self.inner, STORE)?;

        let mut applied: Vec<(&ProductId, u32)> = Vec::with_capacity(lines.len());
        let mut skipped = Vec::new();
        let mut failure = None;

        for (id, qty) in lines {
            if !state.products.contains_key(id) {
                skipped.push(id.clone());
                continue;
            }
            match state.adjust(id, -i64::from(*qty)) {
                Ok(_) => applied.push((id, *qty)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            for (id, qty) in applied {
                // Restoring units taken a moment ago under the same lock.
                if let Err(restore) = state.adjust(id, i64::from(qty)) {
                    warn!(product_id = %id, error = %restore, "rollback failed");
                }
            }
            warn!(error = %e, "reservation rolled back");
            return Err(e);
        }

        let mut items: BTreeMap<ProductId, u32> = BTreeMap::new();
        let mut total = Price::ZERO;
        for (id, qty) in applied {
            if let Some(product) = state.products.get(id) {
                total = total + product.price * qty;
            }
            *items.entry(id.clone()).or_default() += qty;
        }

        Ok(Reservation {
            items,
            total,
            skipped,
        })
    }

    /// Put `items` back into stock, skipping products that no longer exist.
    ///
    /// Returns the skipped product ids.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    #[instrument(skip(self, items))]
    pub fn restock<'a>(
        &self,
        items: impl IntoIterator<Item = (&'a ProductId, &'a u32)>,
    ) -> Result<Vec<ProductId>> {
        let mut state = error::write(&self.inner, STORE)?;
        let mut skipped = Vec::new();

        for (id, qty) in items {
            match state.adjust(id, i64::from(*qty)) {
                Ok(_) => {}
                Err(ShopError::NotFound { .. }) => skipped.push(id.clone()),
                Err(e) => return Err(e),
            }
        }
        Ok(skipped)
    }

    /// Copies of the requested products that exist, keyed by id.
    pub(crate) fn snapshot_of(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<BTreeMap<ProductId, Product>> {
        let state = error::read(&self.inner, STORE)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| {
                let product = state.products.get(&id)?.clone();
                Some((id, product))
            })
            .collect())
    }

    /// Snapshot of all products, in id order.
    pub(crate) fn snapshot(&self) -> Result<Vec<Product>> {
        Ok(error::read(&self.inner, STORE)?
            .products
            .values()
            .cloned()
            .collect())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ShopError::Invalid("product name cannot be empty".to_owned()));
    }
    Ok(())
}

fn validate_rating(rating: f32) -> Result<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ShopError::Invalid(format!(
            "rating must be between 0 and {MAX_RATING}"
        )));
    }
    Ok(())
}
