//! Order history route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use techmart_core::OrderId;
use techmart_ledger::{EntityKind, Order, ReorderOutcome, ShopError};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The user's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.shop().orders().list_for_user(&user.email)?))
}

/// One of the user's orders. Other users' orders are reported as missing.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.shop().orders().get(id)?;
    if order.user != user.email {
        return Err(ShopError::NotFound {
            kind: EntityKind::Order,
            id: id.to_string(),
        }
        .into());
    }
    Ok(Json(order))
}

/// Put the items of a past order back into the cart.
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<ReorderOutcome>> {
    Ok(Json(state.shop().orders().reorder(&user.email, id)?))
}
