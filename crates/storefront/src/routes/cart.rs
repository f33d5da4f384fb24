//! Cart route handlers.
//!
//! Every route acts on the logged-in user's own cart and answers with the
//! cart as it stands afterwards.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use techmart_core::ProductId;
use techmart_ledger::{CartSummary, Order};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Show the cart.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.shop().carts().summary(&user.email)?))
}

/// Add a product to the cart.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartSummary>> {
    let carts = state.shop().carts();
    carts.add_item(&user.email, &body.product_id, body.quantity)?;
    Ok(Json(carts.summary(&user.email)?))
}

/// Replace the quantity of a cart line. Zero removes the line.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartSummary>> {
    let carts = state.shop().carts();
    carts.set_quantity(&user.email, &product_id, body.quantity)?;
    Ok(Json(carts.summary(&user.email)?))
}

/// Remove a line from the cart.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartSummary>> {
    let carts = state.shop().carts();
    carts.remove_item(&user.email, &product_id)?;
    Ok(Json(carts.summary(&user.email)?))
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    state.shop().carts().clear(&user.email)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Place an order from the cart.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.shop().orders().checkout(&user.email)?;
    Ok((StatusCode::CREATED, Json(order)))
}
