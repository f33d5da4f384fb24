//! Admin route handlers.
//!
//! Every handler takes [`RequireAdmin`], which re-checks the admin flag
//! against the account store.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use techmart_core::{Email, OrderId, OrderStatus, ProductId};
use techmart_ledger::{Account, Dashboard, NewProduct, Order, Product, ProductUpdate};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Stock edit request body.
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: u32,
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// Admin flag request body.
#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Dashboard figures.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Dashboard>> {
    Ok(Json(state.shop().dashboard()?))
}

// =============================================================================
// Products
// =============================================================================

/// Add a product.
#[instrument(skip(state, admin, body), fields(admin = %admin.email))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.shop().catalog().create(body)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Edit a product.
#[instrument(skip(state, admin, body), fields(admin = %admin.email))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    Ok(Json(state.shop().catalog().update(&id, body)?))
}

/// Remove a product.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.shop().catalog().delete(&id)?))
}

/// Overwrite a product's stock level.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn set_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<SetStockRequest>,
) -> Result<Json<Product>> {
    Ok(Json(state.shop().catalog().set_stock(&id, body.stock)?))
}

// =============================================================================
// Orders
// =============================================================================

/// Every order, newest first.
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.shop().orders().list_all()?))
}

/// Move an order to a new status.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Order>> {
    Ok(Json(state.shop().orders().advance_status(id, body.status)?))
}

/// Cancel an order and restore its stock.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn cancel_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.shop().orders().cancel(id)?))
}

// =============================================================================
// Users
// =============================================================================

/// Every account.
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Account>>> {
    Ok(Json(state.shop().accounts().list()?))
}

/// Grant or revoke admin rights.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn set_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(email): Path<String>,
    Json(body): Json<SetAdminRequest>,
) -> Result<Json<Account>> {
    let email = Email::parse(&email).map_err(techmart_ledger::ShopError::from)?;
    Ok(Json(state.shop().accounts().set_admin(&email, body.is_admin)?))
}
