//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use techmart_core::Email;
use techmart_ledger::Account;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// Admin rights are not cached here; they are re-read from the account
/// store on every admin request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub name: String,
}

impl From<&Account> for CurrentUser {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            name: account.name.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
