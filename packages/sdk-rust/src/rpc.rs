//! The JSON-RPC boundary.
//!
//! [`RpcGateway`] lists the four calls the discovery pipeline makes.
//! [`SolanaRpc`] serves them from a Solana node through `solana-client`;
//! tests and custom transports supply their own implementation.
//!
//! Transport failures surface as [`Error::Rpc`](crate::Error::Rpc) exactly as
//! the client reported them. Retries, timeouts and endpoint selection belong
//! to the transport.

use solana_account_decoder_client_types::{UiAccountData, UiAccountEncoding, UiDataSliceConfig};
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
    rpc_request::TokenAccountsFilter,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tracing::debug;

use crate::{
    error::Result,
    types::{DataSlice, MemcmpFilter, ParsedTokenAccount, ProgramAccount, TokenHolder},
};

/// Read-only Solana JSON-RPC calls used by [`NftClient`](crate::NftClient).
#[allow(async_fn_in_trait)]
pub trait RpcGateway {
    /// `getTokenAccountsByOwner` restricted to `program_id`, `jsonParsed`.
    async fn token_accounts_by_owner(
        &self,
        owner:      &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Vec<ParsedTokenAccount>>;

    /// `getAccountInfo` in base64. `Ok(None)` when the account does not exist.
    async fn account_data(
        &self,
        address: &Pubkey,
        slice:   Option<DataSlice>,
    ) -> Result<Option<Vec<u8>>>;

    /// `getTokenLargestAccounts` for `mint`.
    async fn token_largest_accounts(&self, mint: &Pubkey) -> Result<Vec<TokenHolder>>;

    /// `getProgramAccounts` in base64, every filter must match.
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters:    &[MemcmpFilter],
    ) -> Result<Vec<ProgramAccount>>;
}

/// [`RpcGateway`] backed by the nonblocking `solana-client` RPC client.
pub struct SolanaRpc {
    rpc: RpcClient,
}

impl SolanaRpc {
    /// Connect to `rpc_url` at `confirmed` commitment.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::from_client(RpcClient::new_with_commitment(
            rpc_url.into(),
            CommitmentConfig::confirmed(),
        ))
    }

    /// Wrap a preconfigured client.
    pub fn from_client(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }
}

impl RpcGateway for SolanaRpc {
    async fn token_accounts_by_owner(
        &self,
        owner:      &Pubkey,
        program_id: &Pubkey,
    ) -> Result<Vec<ParsedTokenAccount>> {
        let keyed = self
            .rpc
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(*program_id))
            .await?;
        debug!(%owner, count = keyed.len(), "getTokenAccountsByOwner");

        Ok(keyed
            .into_iter()
            .map(|keyed| {
                // Accounts the node could not parse come back as binary; they
                // keep an empty program name and are never NFT candidates.
                let (program, parsed) = match keyed.account.data {
                    UiAccountData::Json(parsed) => (parsed.program, parsed.parsed),
                    _ => (String::new(), serde_json::Value::Null),
                };
                ParsedTokenAccount { pubkey: keyed.pubkey, program, parsed }
            })
            .collect())
    }

    async fn account_data(
        &self,
        address: &Pubkey,
        slice:   Option<DataSlice>,
    ) -> Result<Option<Vec<u8>>> {
        let config = RpcAccountInfoConfig {
            encoding:   Some(UiAccountEncoding::Base64),
            data_slice: slice.map(|s| UiDataSliceConfig { offset: s.offset, length: s.length }),
            commitment: Some(self.rpc.commitment()),
            ..Default::default()
        };
        let response = self.rpc.get_account_with_config(address, config).await?;
        debug!(%address, found = response.value.is_some(), "getAccountInfo");
        Ok(response.value.map(|account| account.data))
    }

    async fn token_largest_accounts(&self, mint: &Pubkey) -> Result<Vec<TokenHolder>> {
        let balances = self.rpc.get_token_largest_accounts(mint).await?;
        debug!(%mint, count = balances.len(), "getTokenLargestAccounts");
        Ok(balances
            .into_iter()
            .map(|b| TokenHolder { address: b.address, amount: b.amount.amount })
            .collect())
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters:    &[MemcmpFilter],
    ) -> Result<Vec<ProgramAccount>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(
                filters
                    .iter()
                    .map(|f| {
                        RpcFilterType::Memcmp(Memcmp::new(
                            f.offset,
                            MemcmpEncodedBytes::Bytes(f.bytes.clone()),
                        ))
                    })
                    .collect(),
            ),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            ..Default::default()
        };

        let raw = self
            .rpc
            .get_program_accounts_with_config(program_id, config)
            .await?;
        debug!(%program_id, count = raw.len(), "getProgramAccounts");

        Ok(raw
            .into_iter()
            .map(|(pubkey, account)| ProgramAccount { pubkey, data: account.data })
            .collect())
    }
}
