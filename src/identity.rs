//! Signing-identity resolution
//!
//! Picks which identity to present to the OpenPGP engine when signing,
//! based on the sender address and the configured accounts.

use serde::{Deserialize, Serialize};

/// One configured account: an email address plus an optional explicit
/// signing-key id. Owned by the account store; the resolver only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub email: String,
    pub signing_key: Option<String>,
}

impl AccountIdentity {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            signing_key: None,
        }
    }

    pub fn with_signing_key(email: &str, key_id: &str) -> Self {
        Self {
            email: email.to_string(),
            signing_key: Some(key_id.to_string()),
        }
    }
}

/// Resolve the signer specification for an outbound message.
///
/// Priority order:
/// 1. the account matching the sender has an explicit signing key → that key;
/// 2. exactly one account is configured → `None`, so the engine falls back
///    to its own default identity;
/// 3. otherwise → the sender address itself.
pub fn resolve_signer(from: &str, accounts: &[AccountIdentity]) -> Option<String> {
    if let Some(account) = accounts
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(from))
    {
        if let Some(key) = &account.signing_key {
            log::debug!("signing as configured key {} for {}", key, from);
            return Some(key.clone());
        }
    }
    if accounts.len() == 1 {
        // Single-account setups sign with whatever the engine considers its
        // default key, which may be broader than an address match.
        None
    } else {
        Some(from.to_string())
    }
}
