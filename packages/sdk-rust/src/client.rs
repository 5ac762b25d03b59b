//! NFT discovery over a Solana RPC endpoint.

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::{
    cache::{AddressCache, KeyRef},
    constants::{
        CANDY_MACHINE_OFFSET, DEVNET_RPC, MAINNET_RPC, METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
    },
    error::{Error, Result},
    metadata::{Data, Metadata},
    pda::{find_edition_address, find_metadata_address},
    rpc::{RpcGateway, SolanaRpc},
    token::{is_single_unit, nft_candidate_mint, parse_token_owner},
    types::{DataSlice, MemcmpFilter, OwnedNft},
};

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async, read-only NFT resolver.
///
/// Keys may be passed as base-58 strings or parsed [`Pubkey`]s; strings are
/// parsed once and remembered for the life of the client, as are derived
/// metadata addresses.
///
/// ```rust,no_run
/// # use nft_resolver_sdk::NftClient;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NftClient::mainnet();
/// let wallet = std::env::var("WALLET")?;
/// for nft in client.list_owned_nfts(&wallet).await? {
///     let data = client.get_metadata(nft.mint).await?;
///     println!("{}  {}", data.name, data.uri);
/// }
/// # Ok(())
/// # }
/// ```
pub struct NftClient<G = SolanaRpc> {
    gateway:          G,
    cache:            AddressCache,
    metadata_program: Pubkey,
    token_program:    Pubkey,
}

impl NftClient<SolanaRpc> {
    /// Create a client pointing at any RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_gateway(SolanaRpc::new(rpc_url))
    }

    /// Pre-configured client for Solana devnet.
    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    /// Pre-configured client for Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }
}

impl<G: RpcGateway> NftClient<G> {
    /// Use a custom transport.
    pub fn with_gateway(gateway: G) -> Self {
        Self {
            gateway,
            cache:            AddressCache::new(),
            metadata_program: METADATA_PROGRAM_ID,
            token_program:    TOKEN_PROGRAM_ID,
        }
    }

    /// Override the metadata program ID (useful for local validators).
    pub fn with_metadata_program(mut self, program_id: Pubkey) -> Self {
        self.metadata_program = program_id;
        self
    }

    /// Override the token program ID used for owner enumeration.
    pub fn with_token_program(mut self, program_id: Pubkey) -> Self {
        self.token_program = program_id;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &AddressCache {
        &self.cache
    }

    pub fn metadata_program(&self) -> &Pubkey {
        &self.metadata_program
    }

    // ── Derivations (no RPC) ──────────────────────────────────────────────────

    /// Metadata account address for `mint`.
    pub fn find_metadata_address<'a>(&self, mint: impl Into<KeyRef<'a>>) -> Result<Pubkey> {
        find_metadata_address(&self.cache, mint, &self.metadata_program)
    }

    /// Edition account address for `mint`.
    pub fn find_edition_address<'a>(&self, mint: impl Into<KeyRef<'a>>) -> Result<Pubkey> {
        find_edition_address(&self.cache, mint, &self.metadata_program)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Every token account of `owner` holding exactly one unit of a
    /// zero-decimal mint, in the order the node returned them.
    pub async fn list_owned_nfts<'a>(&self, owner: impl Into<KeyRef<'a>>) -> Result<Vec<OwnedNft>> {
        let owner = self.cache.intern(owner)?;
        let accounts = self
            .gateway
            .token_accounts_by_owner(&owner, &self.token_program)
            .await?;

        let mut nfts = Vec::new();
        for account in &accounts {
            if let Some(mint) = nft_candidate_mint(account)? {
                nfts.push(OwnedNft {
                    account: self.cache.intern(&account.pubkey)?,
                    mint:    self.cache.intern(&mint)?,
                });
            }
        }
        debug!(%owner, scanned = accounts.len(), nfts = nfts.len(), "listed owned NFTs");
        Ok(nfts)
    }

    /// The descriptive `data` block of `mint`'s metadata.
    pub async fn get_metadata<'a>(&self, mint: impl Into<KeyRef<'a>>) -> Result<Data> {
        let address = self.find_metadata_address(mint)?;
        Ok(self.get_metadata_at(&address).await?.data)
    }

    /// Fetch and fully decode the metadata account at `address`.
    pub async fn get_metadata_at(&self, address: &Pubkey) -> Result<Metadata> {
        let data = self
            .gateway
            .account_data(address, None)
            .await?
            .ok_or(Error::AccountNotFound(*address))?;
        Metadata::decode(&data)
    }

    /// Current owner of `mint`, or `None` when nobody holds its single unit
    /// (burned, not yet minted, or fungible).
    pub async fn get_owner<'a>(&self, mint: impl Into<KeyRef<'a>>) -> Result<Option<Pubkey>> {
        let mint = self.cache.intern(mint)?;
        let holders = self.gateway.token_largest_accounts(&mint).await?;

        let Some(holder) = holders.iter().find(|h| is_single_unit(&h.amount, 0)) else {
            debug!(%mint, "no single-unit holder");
            return Ok(None);
        };
        let holder = self.cache.intern(&holder.address)?;

        match self.gateway.account_data(&holder, None).await? {
            Some(data) => parse_token_owner(&data).map(Some),
            None => {
                debug!(%mint, %holder, "holder account closed");
                Ok(None)
            }
        }
    }

    /// Every metadata record whose first creator is `candy_machine`.
    ///
    /// The node must return the full set in one response. The first account
    /// that fails to decode fails the whole call, so a successful result is
    /// always complete.
    pub async fn list_mints_by_authority<'a>(
        &self,
        candy_machine: impl Into<KeyRef<'a>>,
    ) -> Result<Vec<Metadata>> {
        let candy_machine = self.cache.intern(candy_machine)?;
        let filter = MemcmpFilter {
            offset: CANDY_MACHINE_OFFSET,
            bytes:  candy_machine.to_bytes().to_vec(),
        };
        let accounts = self
            .gateway
            .program_accounts(&self.metadata_program, &[filter])
            .await?;

        let records = accounts
            .iter()
            .map(|account| {
                Metadata::decode(&account.data).map_err(|e| {
                    warn!(account = %account.pubkey, "undecodable metadata: {e}");
                    match e {
                        Error::MalformedMetadata { offset, reason } => Error::MalformedMetadata {
                            offset,
                            reason: format!("account {}: {reason}", account.pubkey),
                        },
                        other => other,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(%candy_machine, count = records.len(), "listed mints");
        Ok(records)
    }

    /// Candy machine that minted `mint`, fetched as a 32-byte slice of the
    /// metadata account rather than the whole account.
    pub async fn candy_machine_of<'a>(&self, mint: impl Into<KeyRef<'a>>) -> Result<Pubkey> {
        let address = self.find_metadata_address(mint)?;
        let slice = DataSlice { offset: CANDY_MACHINE_OFFSET, length: 32 };
        let data = self
            .gateway
            .account_data(&address, Some(slice))
            .await?
            .ok_or(Error::AccountNotFound(address))?;

        // Short accounts come back with fewer bytes than requested.
        let bytes: [u8; 32] = data.as_slice().try_into().map_err(|_| Error::MalformedMetadata {
            offset: CANDY_MACHINE_OFFSET,
            reason: format!("data slice returned {} bytes, expected 32", data.len()),
        })?;
        Ok(Pubkey::new_from_array(bytes))
    }

    /// [`list_owned_nfts`](Self::list_owned_nfts) joined with each mint's
    /// metadata. NFTs without a metadata account are left out.
    pub async fn list_owned_with_metadata<'a>(
        &self,
        owner: impl Into<KeyRef<'a>>,
    ) -> Result<Vec<(OwnedNft, Data)>> {
        let nfts = self.list_owned_nfts(owner).await?;
        let mut out = Vec::with_capacity(nfts.len());
        for nft in nfts {
            match self.get_metadata(nft.mint).await {
                Ok(data) => out.push((nft, data)),
                Err(Error::AccountNotFound(address)) => {
                    debug!(mint = %nft.mint, %address, "no metadata account");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}
