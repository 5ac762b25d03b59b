//! Memoized key parsing and program-address derivation.
//!
//! Both maps hold pure functions of immutable inputs, so entries are never
//! evicted or invalidated. Two tasks racing on the same key compute the same
//! value and the second insert is a harmless overwrite.
//!
//! Growth is unbounded. That is fine for a process that resolves a bounded
//! set of wallets and mints, but a long-running indexer feeding it every mint
//! on chain should construct a fresh cache periodically.

use std::str::FromStr;

use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;
use tracing::trace;

use crate::error::{Error, Result};

/// A public key as callers hold it: already parsed, or still base-58 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Parsed(Pubkey),
    Encoded(&'a str),
}

impl From<Pubkey> for KeyRef<'_> {
    fn from(key: Pubkey) -> Self {
        KeyRef::Parsed(key)
    }
}

impl From<&Pubkey> for KeyRef<'_> {
    fn from(key: &Pubkey) -> Self {
        KeyRef::Parsed(*key)
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(key: &'a str) -> Self {
        KeyRef::Encoded(key)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(key: &'a String) -> Self {
        KeyRef::Encoded(key.as_str())
    }
}

/// Process-lifetime cache of parsed public keys and derived addresses.
///
/// One instance is owned by each [`NftClient`](crate::NftClient) and lent to
/// the resolver and decoder call sites.
#[derive(Debug, Default)]
pub struct AddressCache {
    keys:      DashMap<String, Pubkey>,
    addresses: DashMap<String, Pubkey>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key` into a [`Pubkey`], reusing an earlier parse of the same
    /// string. Already-parsed keys pass straight through.
    pub fn intern<'a>(&self, key: impl Into<KeyRef<'a>>) -> Result<Pubkey> {
        let encoded = match key.into() {
            KeyRef::Parsed(key) => return Ok(key),
            KeyRef::Encoded(encoded) => encoded,
        };

        if let Some(hit) = self.keys.get(encoded) {
            return Ok(*hit);
        }

        let parsed = Pubkey::from_str(encoded)
            .map_err(|_| Error::InvalidAddressFormat(encoded.to_string()))?;
        trace!(key = encoded, "interned public key");
        self.keys.insert(encoded.to_string(), parsed);
        Ok(parsed)
    }

    pub(crate) fn derived(&self, cache_key: &str) -> Option<Pubkey> {
        self.addresses.get(cache_key).map(|hit| *hit)
    }

    pub(crate) fn store_derived(&self, cache_key: String, address: Pubkey) {
        self.addresses.insert(cache_key, address);
    }

    /// Number of distinct strings parsed so far.
    pub fn interned_keys(&self) -> usize {
        self.keys.len()
    }

    /// Number of distinct program addresses derived so far.
    pub fn derived_addresses(&self) -> usize {
        self.addresses.len()
    }
}
