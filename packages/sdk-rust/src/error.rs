//! SDK error type.

use solana_sdk::pubkey::Pubkey;

/// All errors returned by the NFT resolver SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed. Passed through untouched; the SDK
    /// never retries.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    /// The RPC response was missing a field the resolver reads.
    #[error("Unexpected RPC response: {0}")]
    UnexpectedResponse(String),

    /// A requested account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    // ── Addresses ────────────────────────────────────────────────────────────
    /// Input was not a valid base-58 encoded 32-byte public key.
    #[error("Invalid address format: {0:?}")]
    InvalidAddressFormat(String),

    #[error("Too many seeds for program address derivation: {0}")]
    TooManySeeds(usize),

    #[error("Seed {index} is {len} bytes; program address seeds are limited to 32")]
    MaxSeedLengthExceeded { index: usize, len: usize },

    /// Every bump in the search range produced an on-curve point.
    #[error("No valid off-curve program address found for the given seeds")]
    NoValidAddressFound,

    // ── Account parsing ──────────────────────────────────────────────────────
    /// Raw metadata account bytes could not be decoded.
    #[error("Malformed metadata at offset {offset}: {reason}")]
    MalformedMetadata { offset: usize, reason: String },

    /// A packed SPL token account was shorter than its fixed layout.
    #[error("Token account is {len} bytes; need at least {need}")]
    MalformedTokenAccount { len: usize, need: usize },
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
