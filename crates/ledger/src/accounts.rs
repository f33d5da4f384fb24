//! Account store.
//!
//! Accounts are keyed by normalized email. Passwords are stored only as
//! Argon2id PHC strings; the hash never leaves this module.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use techmart_core::Email;

use crate::Result;
use crate::error::{self, EntityKind, ShopError};

const STORE: &str = "accounts";

/// Address that is granted admin rights on registration by default.
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@techmart.com";

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub email: Email,
    pub name: String,
    #[serde(skip)]
    password_hash: String,
    pub created_at: DateTime<Utc>,
    pub is_admin: bool,
}

/// Registered accounts.
#[derive(Debug, Clone)]
pub struct Accounts {
    bootstrap_admin: Email,
    params: Params,
    accounts: Arc<RwLock<BTreeMap<Email, Account>>>,
}

impl Accounts {
    /// Create an empty account store with default Argon2id parameters.
    #[must_use]
    pub fn new(bootstrap_admin: Email) -> Self {
        Self::with_params(bootstrap_admin, Params::default())
    }

    /// Create an empty account store hashing with the given parameters.
    #[must_use]
    pub fn with_params(bootstrap_admin: Email, params: Params) -> Self {
        Self {
            bootstrap_admin,
            params,
            accounts: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// The address that is made admin on registration.
    #[must_use]
    pub const fn bootstrap_admin(&self) -> &Email {
        &self.bootstrap_admin
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidEmail` if the email format is invalid.
    /// Returns `ShopError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `ShopError::AlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub fn register(&self, email: &str, password: &str, name: &str) -> Result<Account> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        if error::read(&self.accounts, STORE)?.contains_key(&email) {
            return Err(ShopError::already_exists(EntityKind::Account, &email));
        }

        // Hashing is slow; keep it outside the write lock.
        let password_hash = self.hash_password(password)?;

        let mut accounts = error::write(&self.accounts, STORE)?;
        if accounts.contains_key(&email) {
            return Err(ShopError::already_exists(EntityKind::Account, &email));
        }

        let name = name.trim();
        let account = Account {
            name: if name.is_empty() {
                email.local_part().to_owned()
            } else {
                name.to_owned()
            },
            is_admin: email == self.bootstrap_admin,
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        accounts.insert(email, account.clone());

        info!(email = %account.email, is_admin = account.is_admin, "account registered");
        Ok(account)
    }

    /// Check an email and password.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[instrument(skip(self, password))]
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let Ok(email) = Email::parse(email) else {
            return Err(ShopError::InvalidCredentials);
        };

        let account = error::read(&self.accounts, STORE)?
            .get(&email)
            .cloned()
            .ok_or(ShopError::InvalidCredentials)?;

        if let Err(e) = verify_password(password, &account.password_hash) {
            warn!(%email, "failed login attempt");
            return Err(e);
        }
        Ok(account)
    }

    /// Grant or revoke admin rights.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the account is unknown and
    /// `ShopError::Forbidden` when revoking the bootstrap admin.
    #[instrument(skip(self))]
    pub fn set_admin(&self, email: &Email, is_admin: bool) -> Result<Account> {
        if !is_admin && email == &self.bootstrap_admin {
            return Err(ShopError::Forbidden(
                "cannot revoke admin rights of the bootstrap admin".to_owned(),
            ));
        }

        let mut accounts = error::write(&self.accounts, STORE)?;
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| ShopError::not_found(EntityKind::Account, email))?;
        account.is_admin = is_admin;

        info!(%email, is_admin, "admin flag changed");
        Ok(account.clone())
    }

    /// Get an account by email.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the account is unknown.
    pub fn get(&self, email: &Email) -> Result<Account> {
        error::read(&self.accounts, STORE)?
            .get(email)
            .cloned()
            .ok_or_else(|| ShopError::not_found(EntityKind::Account, email))
    }

    /// Whether the account exists and currently has admin rights.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn is_admin(&self, email: &Email) -> Result<bool> {
        Ok(error::read(&self.accounts, STORE)?
            .get(email)
            .is_some_and(|account| account.is_admin))
    }

    /// All accounts, ordered by email.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn list(&self) -> Result<Vec<Account>> {
        Ok(error::read(&self.accounts, STORE)?
            .values()
            .cloned()
            .collect())
    }

    /// Number of registered accounts.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::LockPoisoned` if the store is unusable.
    pub fn count(&self) -> Result<usize> {
        Ok(error::read(&self.accounts, STORE)?.len())
    }

    /// Hash a password using Argon2id.
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| ShopError::PasswordHash)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ShopError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Verify a password against a hash. Parameters are read from the hash.
fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ShopError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ShopError::InvalidCredentials)
}
