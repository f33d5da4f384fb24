//! Authentication route handlers.
//!
//! Handles registration, login and logout with email and password. The
//! logged-in identity lives in the session.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use techmart_ledger::{Account, UserStats};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Account overview.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub account: Account,
    pub stats: UserStats,
}

// =============================================================================
// Routes
// =============================================================================

/// Register a new account and log it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let account = state
        .shop()
        .accounts()
        .register(&body.email, &body.password, &body.name)?;

    set_current_user(&session, &CurrentUser::from(&account)).await?;
    set_sentry_user(account.email.as_str());

    Ok((StatusCode::CREATED, Json(account)))
}

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Account>> {
    let account = state
        .shop()
        .accounts()
        .authenticate(&body.email, &body.password)?;

    set_current_user(&session, &CurrentUser::from(&account)).await?;
    set_sentry_user(account.email.as_str());
    tracing::info!(email = %account.email, "user logged in");

    Ok(Json(account))
}

/// Log out.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user's account and order figures.
pub async fn account(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AccountView>> {
    let account = state.shop().accounts().get(&user.email)?;
    let stats = state.shop().user_stats(&user.email)?;
    Ok(Json(AccountView { account, stats }))
}
