//! Program-derived address resolution.
//!
//! [`find_program_address`] reimplements Solana's derivation on top of
//! `sha2` and `curve25519-dalek` so the bump search is an explicit bounded
//! loop with a terminal error:
//!
//! ```text
//! candidate = SHA-256(seed_0 ‖ … ‖ seed_n ‖ [bump] ‖ program_id ‖ "ProgramDerivedAddress")
//! ```
//!
//! Bumps are tried from 255 down to 1; the first candidate that is *not* a
//! valid compressed Ed25519 point wins. The result is identical to
//! `Pubkey::find_program_address` byte for byte.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    cache::{AddressCache, KeyRef},
    constants::{EDITION_SEED, METADATA_SEED},
    error::{Error, Result},
};

/// Seeds plus the bump byte may not exceed this count.
pub const MAX_SEEDS: usize = 16;
/// Upper bound on the length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Derive `(address, bump)` for `seeds` under `program_id`.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    // One slot is reserved for the bump.
    if seeds.len() >= MAX_SEEDS {
        return Err(Error::TooManySeeds(seeds.len()));
    }
    if let Some((index, seed)) = seeds.iter().enumerate().find(|(_, s)| s.len() > MAX_SEED_LEN) {
        return Err(Error::MaxSeedLengthExceeded { index, len: seed.len() });
    }

    for bump in (1..=u8::MAX).rev() {
        let candidate = pda_hash(seeds, bump, program_id);
        if !is_on_ed25519_curve(&candidate) {
            return Ok((Pubkey::new_from_array(candidate), bump));
        }
    }
    Err(Error::NoValidAddressFound)
}

/// SHA-256 over the concatenation of all inputs: no length prefixes, no
/// separators.
fn pda_hash(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> [u8; 32] {
    let mut h = Sha256::new();
    for seed in seeds {
        h.update(seed);
    }
    h.update([bump]);
    h.update(program_id.as_ref());
    h.update(PDA_MARKER);
    h.finalize().into()
}

/// Returns true if `bytes` decompresses to a point on Ed25519.
fn is_on_ed25519_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Derive through `cache`, keyed on the hex of every seed plus the
/// requesting key's base-58 form.
fn find_cached(
    cache:      &AddressCache,
    seeds:      &[&[u8]],
    program_id: &Pubkey,
    requester:  &Pubkey,
) -> Result<Pubkey> {
    let mut cache_key = String::from("pda-");
    for seed in seeds {
        cache_key.push_str(&hex::encode(seed));
    }
    cache_key.push_str(&requester.to_string());

    if let Some(hit) = cache.derived(&cache_key) {
        return Ok(hit);
    }

    let (address, bump) = find_program_address(seeds, program_id)?;
    debug!(%requester, %address, bump, "derived program address");
    cache.store_derived(cache_key, address);
    Ok(address)
}

/// Metadata account for `mint`: seeds `["metadata", program_id, mint]`.
///
/// The seed order is part of the on-chain derivation and must not change.
pub fn find_metadata_address<'a>(
    cache:      &AddressCache,
    mint:       impl Into<KeyRef<'a>>,
    program_id: &Pubkey,
) -> Result<Pubkey> {
    let mint = cache.intern(mint)?;
    find_cached(
        cache,
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref()],
        program_id,
        &mint,
    )
}

/// Master/print edition account for `mint`:
/// seeds `["metadata", program_id, mint, "edition"]`.
pub fn find_edition_address<'a>(
    cache:      &AddressCache,
    mint:       impl Into<KeyRef<'a>>,
    program_id: &Pubkey,
) -> Result<Pubkey> {
    let mint = cache.intern(mint)?;
    find_cached(
        cache,
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref(), EDITION_SEED],
        program_id,
        &mint,
    )
}
