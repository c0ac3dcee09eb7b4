//! Bearer-token slots, one per namespace family.
//!
//! The external-app and customer namespaces each own a slot. All
//! caller-named namespaces share a single `Other` slot, so the most
//! recently created "other" token is used for every "other" prefix.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::types::Namespace;

/// Storage key for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    ExternalApp,
    CustomerApi,
    Other,
}

impl From<&Namespace> for TokenSlot {
    fn from(namespace: &Namespace) -> Self {
        match namespace {
            Namespace::ExternalApp => TokenSlot::ExternalApp,
            Namespace::CustomerApi => TokenSlot::CustomerApi,
            Namespace::Other(_) => TokenSlot::Other,
        }
    }
}

/// Most recently obtained token per slot. No expiry tracking.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Mutex<HashMap<TokenSlot, String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token for the namespace's slot, if one was ever set.
    pub fn get(&self, namespace: &Namespace) -> Option<String> {
        self.tokens.lock().get(&TokenSlot::from(namespace)).cloned()
    }

    /// Overwrite the namespace's slot.
    pub fn set(&self, namespace: &Namespace, token: impl Into<String>) {
        self.tokens
            .lock()
            .insert(TokenSlot::from(namespace), token.into());
    }

    /// Empty the namespace's slot, returning what was there.
    pub fn clear(&self, namespace: &Namespace) -> Option<String> {
        self.tokens.lock().remove(&TokenSlot::from(namespace))
    }
}
