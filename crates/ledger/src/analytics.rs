//! Read-only aggregates for the admin dashboard.
//!
//! Everything here is computed from snapshots; nothing holds a store lock.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use techmart_core::{Category, OrderStatus, Price, ProductId};

use crate::catalog::Product;
use crate::orders::Order;

/// Number of entries in [`Dashboard::top_products`].
pub const TOP_PRODUCTS: usize = 5;

/// Admin dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub product_count: usize,
    pub order_count: usize,
    pub account_count: usize,
    /// Sum of totals of orders that were not cancelled.
    pub revenue: Price,
    pub status_counts: BTreeMap<OrderStatus, usize>,
    pub top_products: Vec<TopProduct>,
    pub products_by_category: BTreeMap<Category, usize>,
    pub daily_revenue: Vec<DailyRevenue>,
}

/// A best seller, by units in non-cancelled orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub units_sold: u64,
}

/// Revenue for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Price,
    pub orders: usize,
}

/// Order figures for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub order_count: usize,
    /// Sum of totals of the user's orders that were not cancelled.
    pub total_spent: Price,
}

impl Dashboard {
    /// Build the dashboard from store snapshots.
    #[must_use]
    pub fn compute(products: &[Product], orders: &[Order], account_count: usize) -> Self {
        let mut status_counts = BTreeMap::new();
        for order in orders {
            *status_counts.entry(order.status).or_default() += 1;
        }

        let mut products_by_category = BTreeMap::new();
        for product in products {
            *products_by_category.entry(product.category).or_default() += 1;
        }

        Self {
            product_count: products.len(),
            order_count: orders.len(),
            account_count,
            revenue: revenue(orders),
            status_counts,
            top_products: top_products(products, orders, TOP_PRODUCTS),
            products_by_category,
            daily_revenue: daily_revenue(orders),
        }
    }
}

impl UserStats {
    /// Figures over one user's orders.
    #[must_use]
    pub fn compute(orders: &[Order]) -> Self {
        Self {
            order_count: orders.len(),
            total_spent: revenue(orders),
        }
    }
}

/// Sum of totals of non-cancelled orders.
#[must_use]
pub fn revenue(orders: &[Order]) -> Price {
    orders
        .iter()
        .filter(|order| order.holds_stock())
        .map(|order| order.total)
        .sum()
}

/// The `limit` products with the most units in non-cancelled orders.
///
/// Products no longer in the catalog are left out. Ties go to the lower id.
#[must_use]
pub fn top_products(products: &[Product], orders: &[Order], limit: usize) -> Vec<TopProduct> {
    let mut units: HashMap<&ProductId, u64> = HashMap::new();
    for order in orders.iter().filter(|order| order.holds_stock()) {
        for (product_id, qty) in &order.items {
            *units.entry(product_id).or_default() += u64::from(*qty);
        }
    }

    let mut top: Vec<TopProduct> = products
        .iter()
        .filter_map(|product| {
            let units_sold = *units.get(&product.id)?;
            Some(TopProduct {
                product_id: product.id.clone(),
                name: product.name.clone(),
                units_sold,
            })
        })
        .collect();
    top.sort_by(|a, b| {
        b.units_sold
            .cmp(&a.units_sold)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    top.truncate(limit);
    top
}

/// Revenue of non-cancelled orders per day, oldest first.
#[must_use]
pub fn daily_revenue(orders: &[Order]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, (Price, usize)> = BTreeMap::new();
    for order in orders.iter().filter(|order| order.holds_stock()) {
        let day = days.entry(order.created_at.date_naive()).or_default();
        day.0 = day.0 + order.total;
        day.1 += 1;
    }
    days.into_iter()
        .map(|(date, (revenue, orders))| DailyRevenue {
            date,
            revenue,
            orders,
        })
        .collect()
}
