//! SPL token account helpers.

use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{SPL_TOKEN_PROGRAM_NAME, TOKEN_ACCOUNT_OWNER_OFFSET},
    error::{Error, Result},
    types::ParsedTokenAccount,
};

/// The `parsed` object of a `jsonParsed` SPL token account.
#[derive(Debug, Deserialize)]
struct ParsedTokenData {
    info: TokenInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenInfo {
    mint:         String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount:   String,
    decimals: u8,
}

/// True for a balance of exactly one indivisible unit.
pub fn is_single_unit(amount: &str, decimals: u8) -> bool {
    decimals == 0 && amount.parse::<u64>() == Ok(1)
}

/// The mint of `account` if it is an SPL token account holding exactly one
/// indivisible unit, `None` otherwise.
pub fn nft_candidate_mint(account: &ParsedTokenAccount) -> Result<Option<String>> {
    if account.program != SPL_TOKEN_PROGRAM_NAME {
        return Ok(None);
    }
    let parsed: ParsedTokenData = serde_json::from_value(account.parsed.clone()).map_err(|e| {
        Error::UnexpectedResponse(format!("token account {}: {e}", account.pubkey))
    })?;
    let amount = parsed.info.token_amount;
    Ok(is_single_unit(&amount.amount, amount.decimals).then_some(parsed.info.mint))
}

/// Read the owner field from a packed token account.
///
/// Layout: `mint(32) owner(32) amount(8) …`
pub fn parse_token_owner(data: &[u8]) -> Result<Pubkey> {
    let need = TOKEN_ACCOUNT_OWNER_OFFSET + 32;
    let bytes: [u8; 32] = data
        .get(TOKEN_ACCOUNT_OWNER_OFFSET..need)
        .and_then(|s| s.try_into().ok())
        .ok_or(Error::MalformedTokenAccount { len: data.len(), need })?;
    Ok(Pubkey::new_from_array(bytes))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn account(program: &str, amount: &str, decimals: u8) -> ParsedTokenAccount {
        ParsedTokenAccount {
            pubkey:  "acct".into(),
            program: program.into(),
            parsed:  json!({
                "type": "account",
                "info": {
                    "mint": "mint",
                    "owner": "owner",
                    "tokenAmount": { "amount": amount, "decimals": decimals, "uiAmount": 1.0 },
                },
            }),
        }
    }

    #[test]
    fn single_unit_filter() {
        assert!(is_single_unit("1", 0));
        assert!(!is_single_unit("5", 0));
        assert!(!is_single_unit("1", 2));
        assert!(!is_single_unit("0", 0));
        assert!(!is_single_unit("", 0));
    }

    #[test]
    fn candidate_mint_requires_spl_token_program() {
        assert_eq!(nft_candidate_mint(&account("spl-token", "1", 0)).unwrap(), Some("mint".into()));
        assert_eq!(nft_candidate_mint(&account("spl-token-2022", "1", 0)).unwrap(), None);
        assert_eq!(nft_candidate_mint(&account("spl-token", "5", 0)).unwrap(), None);
    }

    #[test]
    fn candidate_mint_reports_missing_fields() {
        let mut acct = account("spl-token", "1", 0);
        acct.parsed = json!({ "info": { "mint": "mint" } });

        assert!(matches!(nft_candidate_mint(&acct), Err(Error::UnexpectedResponse(_))));
    }

    #[test]
    fn owner_is_read_at_offset_32() {
        let mut data = vec![0u8; 165];
        data[32..64].copy_from_slice(&[3; 32]);

        assert_eq!(parse_token_owner(&data).unwrap(), Pubkey::new_from_array([3; 32]));
        assert!(matches!(
            parse_token_owner(&data[..63]),
            Err(Error::MalformedTokenAccount { len: 63, need: 64 })
        ));
    }
}
