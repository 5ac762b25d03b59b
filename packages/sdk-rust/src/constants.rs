//! Well-known program identifiers and on-chain layout constants.
//!
//! The program IDs must match the deployed values exactly: a wrong ID still
//! derives an address, just not the one holding any data.

use solana_sdk::{pubkey, pubkey::Pubkey};

// ─── Program IDs ──────────────────────────────────────────────────────────────

/// Metaplex Token Metadata program.
pub const METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Program name reported by `jsonParsed` encoding for SPL token accounts.
pub const SPL_TOKEN_PROGRAM_NAME: &str = "spl-token";

// ─── PDA seeds ────────────────────────────────────────────────────────────────

pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED:  &[u8] = b"edition";

// ─── Metadata account layout ──────────────────────────────────────────────────

/// `key` tag written by the program for metadata accounts.
pub const METADATA_V1_KEY: u8 = 4;

pub const MAX_NAME_LENGTH:   usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH:    usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;

/// Byte offset of the first creator's address, which candy machines set to
/// their own address.
///
/// key(1) update_authority(32) mint(32) name(4+32) symbol(4+10) uri(4+200)
/// seller_fee_basis_points(2) creators_tag(1) creators_len(4) = 326
pub const CANDY_MACHINE_OFFSET: usize = 326;

// ─── SPL token account layout ─────────────────────────────────────────────────

/// Packed token account: `mint(32) owner(32) amount(8) …`
pub const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;

// ─── RPC endpoints ────────────────────────────────────────────────────────────

pub const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
