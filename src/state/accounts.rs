//! Account and token lookups over the state document.
//!
//! Accounts are keyed by alias. An input shaped like `shard.realm.num`
//! is always treated as an account ID and matched by scanning; anything
//! else is an alias. The two never fall back to each other.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::LookupError;
use crate::state::{Account, StateStore, TokenAssociation};

fn account_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").ok())
        .as_ref()
}

/// Whether `input` has the `shard.realm.num` account ID shape.
pub fn is_account_id(input: &str) -> bool {
    account_id_pattern().is_some_and(|re| re.is_match(input))
}

/// Resolves accounts by ID or alias against a [`StateStore`].
pub struct AccountResolver<'a> {
    store: &'a StateStore,
}

impl<'a> AccountResolver<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    /// First account whose `accountId` equals `account_id`.
    pub fn resolve_by_id(&self, account_id: &str) -> Result<Option<Account>, LookupError> {
        let account = self.store.get(|state| {
            state
                .accounts
                .values()
                .find(|account| account.account_id == account_id)
                .cloned()
        })?;
        Ok(account)
    }

    pub fn resolve_by_alias(&self, alias: &str) -> Result<Option<Account>, LookupError> {
        Ok(self.store.get(|state| state.accounts.get(alias).cloned())?)
    }

    pub fn resolve_by_id_or_alias(&self, input: &str) -> Result<Account, LookupError> {
        let account = if is_account_id(input) {
            self.resolve_by_id(input)?
        } else {
            self.resolve_by_alias(input)?
        };
        account.ok_or_else(|| LookupError::AccountNotFound(input.to_string()))
    }
}

/// Append an `{alias, accountId}` association to a known token.
pub fn add_token_association(
    store: &StateStore,
    token_id: &str,
    account_id: &str,
    alias: &str,
) -> Result<(), LookupError> {
    store.update(|state| {
        let token = state
            .tokens
            .get_mut(token_id)
            .ok_or_else(|| LookupError::TokenNotFound(token_id.to_string()))?;
        token.associations.push(TokenAssociation {
            alias: alias.to_string(),
            account_id: account_id.to_string(),
        });
        Ok::<_, LookupError>(())
    })?;
    tracing::debug!("Associated {} ({}) with token {}", alias, account_id, token_id);
    Ok(())
}
