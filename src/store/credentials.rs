//! Typed accessors over a [`SecureStore`].
//!
//! Every entry is stored as a string; numbers and timestamps are encoded on
//! write and parsed on read. An unparseable value reads as absent.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::api::models::AuthSession;
use crate::core::errors::Result;
use crate::store::secure::SecureStore;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USERNAME_KEY: &str = "username";
pub const TOKEN_BALANCE_KEY: &str = "token_balance";
pub const ACCOUNT_CREATED_AT_KEY: &str = "account_created_at";

const ALL_KEYS: [&str; 5] = [
    ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USERNAME_KEY,
    TOKEN_BALANCE_KEY,
    ACCOUNT_CREATED_AT_KEY,
];

/// Session credentials and account facts.
pub struct CredentialStore {
    backend: Arc<dyn SecureStore>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn SecureStore>) -> Self {
        Self { backend }
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.backend.get(ACCESS_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.backend.set(ACCESS_TOKEN_KEY, token)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.backend.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.backend.set(REFRESH_TOKEN_KEY, token)
    }

    pub fn username(&self) -> Result<Option<String>> {
        self.backend.get(USERNAME_KEY)
    }

    pub fn set_username(&self, username: &str) -> Result<()> {
        self.backend.set(USERNAME_KEY, username)
    }

    /// Balance of purchasable tokens; zero when never stored.
    pub fn token_balance(&self) -> Result<u64> {
        Ok(self
            .backend
            .get(TOKEN_BALANCE_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0))
    }

    pub fn set_token_balance(&self, balance: u64) -> Result<()> {
        self.backend.set(TOKEN_BALANCE_KEY, &balance.to_string())
    }

    /// Credit tokens after a purchase and return the new balance.
    pub fn add_tokens(&self, amount: u64) -> Result<u64> {
        let balance = self.token_balance()?.saturating_add(amount);
        self.set_token_balance(balance)?;
        Ok(balance)
    }

    pub fn account_created_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .backend
            .get(ACCOUNT_CREATED_AT_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    pub fn set_account_created_at(&self, at: DateTime<Utc>) -> Result<()> {
        self.backend.set(ACCOUNT_CREATED_AT_KEY, &at.to_rfc3339())
    }

    pub fn is_signed_in(&self) -> Result<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Persist everything a sign-in, sign-up or refresh returned.
    pub fn store_session(&self, session: &AuthSession) -> Result<()> {
        self.set_access_token(&session.access_token)?;
        self.set_refresh_token(&session.refresh_token)?;
        self.set_username(&session.username)?;
        self.set_token_balance(session.token_balance)?;
        self.set_account_created_at(session.created_at)
    }

    /// Remove every credential entry (sign-out).
    pub fn clear(&self) -> Result<()> {
        for key in ALL_KEYS {
            self.backend.remove(key)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
