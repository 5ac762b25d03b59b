//! Shared fixtures: an in-memory RPC gateway and a metadata account builder.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use nft_resolver_sdk::{
    constants::{MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH, METADATA_V1_KEY},
    DataSlice, Error, MemcmpFilter, ParsedTokenAccount, ProgramAccount, Result, RpcGateway,
    TokenHolder,
};
use serde_json::json;
use solana_client::client_error::ClientErrorKind;
use solana_sdk::pubkey::Pubkey;

/// Full size of a metadata account as allocated by the program.
pub const METADATA_ACCOUNT_LEN: usize = 679;

// ─── Fake gateway ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeGateway {
    pub token_accounts:   HashMap<Pubkey, Vec<ParsedTokenAccount>>,
    pub accounts:         HashMap<Pubkey, Vec<u8>>,
    pub largest:          HashMap<Pubkey, Vec<TokenHolder>>,
    pub program_accounts: HashMap<Pubkey, Vec<ProgramAccount>>,
    /// Fail every call with a transport error.
    pub offline:          bool,
    pub calls:            Mutex<Vec<&'static str>>,
}

impl FakeGateway {
    fn record(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method);
        if self.offline {
            return Err(Error::Rpc(ClientErrorKind::Custom("connection refused".into()).into()));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl RpcGateway for FakeGateway {
    async fn token_accounts_by_owner(
        &self,
        owner:       &Pubkey,
        _program_id: &Pubkey,
    ) -> Result<Vec<ParsedTokenAccount>> {
        self.record("getTokenAccountsByOwner")?;
        Ok(self.token_accounts.get(owner).cloned().unwrap_or_default())
    }

    async fn account_data(
        &self,
        address: &Pubkey,
        slice:   Option<DataSlice>,
    ) -> Result<Option<Vec<u8>>> {
        self.record("getAccountInfo")?;
        Ok(self.accounts.get(address).map(|data| match slice {
            Some(s) => {
                let start = s.offset.min(data.len());
                let end = (s.offset + s.length).min(data.len());
                data[start..end].to_vec()
            }
            None => data.clone(),
        }))
    }

    async fn token_largest_accounts(&self, mint: &Pubkey) -> Result<Vec<TokenHolder>> {
        self.record("getTokenLargestAccounts")?;
        Ok(self.largest.get(mint).cloned().unwrap_or_default())
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters:    &[MemcmpFilter],
    ) -> Result<Vec<ProgramAccount>> {
        self.record("getProgramAccounts")?;
        Ok(self
            .program_accounts
            .get(program_id)
            .map(|accounts| {
                accounts
                    .iter()
                    .filter(|a| {
                        filters.iter().all(|f| {
                            a.data.get(f.offset..f.offset + f.bytes.len()) == Some(&f.bytes[..])
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// A `jsonParsed` token account entry.
pub fn token_account(pubkey: &Pubkey, mint: &Pubkey, amount: &str, decimals: u8) -> ParsedTokenAccount {
    ParsedTokenAccount {
        pubkey:  pubkey.to_string(),
        program: "spl-token".into(),
        parsed:  json!({
            "type": "account",
            "info": {
                "isNative": false,
                "mint": mint.to_string(),
                "owner": Pubkey::new_unique().to_string(),
                "state": "initialized",
                "tokenAmount": {
                    "amount": amount,
                    "decimals": decimals,
                    "uiAmountString": amount,
                },
            },
        }),
    }
}

/// A packed 165-byte SPL token account.
pub fn packed_token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(165);
    data.extend_from_slice(mint.as_ref());
    data.extend_from_slice(owner.as_ref());
    data.extend_from_slice(&amount.to_le_bytes());
    data.resize(165, 0);
    data
}

// ─── Metadata builder ─────────────────────────────────────────────────────────

pub struct MetadataBuilder {
    pub update_authority: Pubkey,
    pub mint:             Pubkey,
    pub name:             String,
    pub symbol:           String,
    pub uri:              String,
    pub creators:         Option<Vec<(Pubkey, bool, u8)>>,
}

impl MetadataBuilder {
    pub fn new(mint: Pubkey, name: &str) -> Self {
        Self {
            update_authority: Pubkey::new_unique(),
            mint,
            name:     name.into(),
            symbol:   "NFT".into(),
            uri:      format!("https://arweave.net/{name}"),
            creators: None,
        }
    }

    pub fn candy_machine(mut self, candy_machine: Pubkey) -> Self {
        self.creators = Some(vec![(candy_machine, true, 0), (Pubkey::new_unique(), false, 100)]);
        self
    }

    /// Strings padded to their maximum widths and the account zero-filled to
    /// full size, matching what the program writes.
    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![METADATA_V1_KEY];
        buf.extend_from_slice(self.update_authority.as_ref());
        buf.extend_from_slice(self.mint.as_ref());
        put_padded(&mut buf, &self.name, MAX_NAME_LENGTH);
        put_padded(&mut buf, &self.symbol, MAX_SYMBOL_LENGTH);
        put_padded(&mut buf, &self.uri, MAX_URI_LENGTH);
        buf.extend_from_slice(&500u16.to_le_bytes());
        match &self.creators {
            Some(creators) => {
                buf.push(1);
                buf.extend_from_slice(&(creators.len() as u32).to_le_bytes());
                for (address, verified, share) in creators {
                    buf.extend_from_slice(address.as_ref());
                    buf.push(*verified as u8);
                    buf.push(*share);
                }
            }
            None => buf.push(0),
        }
        buf.push(0); // primary_sale_happened
        buf.push(1); // is_mutable
        buf.extend_from_slice(&[1, 255]); // edition_nonce
        buf.resize(METADATA_ACCOUNT_LEN, 0);
        buf
    }
}

fn put_padded(buf: &mut Vec<u8>, s: &str, width: usize) {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(width, 0);
    buf.extend_from_slice(&(width as u32).to_le_bytes());
    buf.extend_from_slice(&bytes);
}
