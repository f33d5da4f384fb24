//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use techmart_core::{Category, ProductId};
use techmart_ledger::{Product, ProductQuery, ProductSort};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Catalog listing query parameters.
///
/// Empty values are treated as absent so that `?search=&category=` works.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    fn into_product_query(self) -> Result<ProductQuery> {
        let category = non_empty(self.category)
            .map(|c| c.parse::<Category>())
            .transpose()
            .map_err(AppError::BadRequest)?;
        let sort = non_empty(self.sort)
            .map(|s| parse_sort(&s))
            .transpose()?
            .unwrap_or_default();

        Ok(ProductQuery {
            search: non_empty(self.search),
            category,
            sort,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_sort(s: &str) -> Result<ProductSort> {
    match s.trim().to_ascii_lowercase().as_str() {
        "name" => Ok(ProductSort::Name),
        "price_asc" => Ok(ProductSort::PriceAsc),
        "price_desc" => Ok(ProductSort::PriceDesc),
        "rating" => Ok(ProductSort::Rating),
        other => Err(AppError::BadRequest(format!("unknown sort order: {other}"))),
    }
}

/// List products.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let query = query.into_product_query()?;
    Ok(Json(state.shop().catalog().list(&query)?))
}

/// Show one product.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.shop().catalog().get(&id)?))
}

/// Categories present in the catalog.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.shop().catalog().categories()?))
}
