//! Records exchanged between the discovery pipeline and the RPC gateway.

use solana_sdk::pubkey::Pubkey;

/// One entry of a `getTokenAccountsByOwner` response in `jsonParsed`
/// encoding. Field extraction from `parsed` happens in [`crate::token`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTokenAccount {
    pub pubkey:  String,
    /// Parser that produced `parsed`, e.g. `"spl-token"`.
    pub program: String,
    pub parsed:  serde_json::Value,
}

/// One entry of a `getTokenLargestAccounts` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolder {
    pub address: String,
    /// Raw amount in atomic units, as a decimal string.
    pub amount:  String,
}

/// One entry of a `getProgramAccounts` response, data already base64-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAccount {
    pub pubkey: Pubkey,
    pub data:   Vec<u8>,
}

/// `memcmp` filter: account data at `offset` must equal `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes:  Vec<u8>,
}

/// Request only `length` bytes starting at `offset` of an account's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSlice {
    pub offset: usize,
    pub length: usize,
}

/// A token account holding exactly one unit of a zero-decimal mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedNft {
    pub account: Pubkey,
    pub mint:    Pubkey,
}
