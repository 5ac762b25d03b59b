//! NFT Resolver Rust SDK
//!
//! Read-only resolution of Solana NFT ownership and Metaplex metadata.
//! Given a wallet or a mint, the SDK enumerates token accounts, derives the
//! metadata account address, fetches it over JSON-RPC and decodes it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nft_resolver_sdk::NftClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NftClient::mainnet();
//!     let mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
//!
//!     // Pure derivation, no RPC round-trip.
//!     println!("metadata account: {}", client.find_metadata_address(mint)?);
//!
//!     let data = client.get_metadata(mint).await?;
//!     println!("{} ({}) → {}", data.name, data.symbol, data.uri);
//!
//!     match client.get_owner(mint).await? {
//!         Some(owner) => println!("held by {owner}"),
//!         None        => println!("no single holder"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`NftClient::find_metadata_address`] | Metadata PDA for a mint (cached) |
//! | [`NftClient::find_edition_address`] | Edition PDA for a mint (cached) |
//! | [`NftClient::list_owned_nfts`] | Single-unit token accounts of a wallet |
//! | [`NftClient::get_metadata`] | Decoded `data` block for a mint |
//! | [`NftClient::get_owner`] | Current holder of a mint |
//! | [`NftClient::list_mints_by_authority`] | All metadata minted by a candy machine |
//! | [`NftClient::candy_machine_of`] | Candy machine of a mint via a 32-byte slice |
//! | [`NftClient::list_owned_with_metadata`] | Owned NFTs joined with their metadata |
//!
//! Offline helpers: [`Metadata::decode`], [`extract_candy_machine_address`],
//! [`pda::find_program_address`].

pub mod cache;
pub mod client;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod pda;
pub mod rpc;
pub mod token;
pub mod types;

pub use cache::{AddressCache, KeyRef};
pub use client::NftClient;
pub use error::{Error, Result};
pub use metadata::{
    extract_candy_machine_address, Collection, Creator, Data, Metadata, TokenStandard, Uses,
};
pub use rpc::{RpcGateway, SolanaRpc};
pub use types::*;
