//! Metaplex metadata account deserialization.
//!
//! Layout (Borsh, little-endian):
//! ```text
//! key(1)  update_authority(32)  mint(32)
//! data:
//!   name(4+n)  symbol(4+n)  uri(4+n)  seller_fee_basis_points(2)
//!   creators: Option<Vec<address(32) verified(1) share(1)>>
//! primary_sale_happened(1)  is_mutable(1)  edition_nonce: Option<u8>
//! token_standard: Option<u8>  collection: Option<verified(1) key(32)>
//! uses: Option<use_method(1) remaining(8) total(8)>
//! ```
//!
//! Everything through `edition_nonce` is required. The fields after it were
//! appended by later program versions and are read only while the buffer
//! holds them; any bytes beyond the last known field are ignored.
//!
//! The program writes `name`, `symbol` and `uri` NUL-padded to fixed widths,
//! so all NUL characters are stripped from those strings on decode.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::trace;

use crate::{
    constants::{CANDY_MACHINE_OFFSET, MAX_CREATOR_LIMIT},
    error::{Error, Result},
};

// ─── Records ──────────────────────────────────────────────────────────────────

/// Decoded metadata account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub key:                   u8,
    pub update_authority:      Pubkey,
    pub mint:                  Pubkey,
    pub data:                  Data,
    pub primary_sale_happened: bool,
    pub is_mutable:            bool,
    pub edition_nonce:         Option<u8>,
    pub token_standard:        Option<TokenStandard>,
    pub collection:            Option<Collection>,
    pub uses:                  Option<Uses>,
}

/// The descriptive block shared by every metadata version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name:                    String,
    pub symbol:                  String,
    pub uri:                     String,
    pub seller_fee_basis_points: u16,
    pub creators:                Option<Vec<Creator>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub struct Creator {
    pub address:  Pubkey,
    pub verified: bool,
    /// Percentage of royalties, all shares sum to 100.
    pub share:    u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub struct Collection {
    pub verified: bool,
    pub key:      Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub struct Uses {
    /// 0 = burn, 1 = multiple, 2 = single.
    pub use_method: u8,
    pub remaining:  u64,
    pub total:      u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
    ProgrammableNonFungibleEdition,
    /// A discriminant newer than this decoder.
    Unknown(u8),
}

impl From<u8> for TokenStandard {
    fn from(tag: u8) -> Self {
        match tag {
            0 => TokenStandard::NonFungible,
            1 => TokenStandard::FungibleAsset,
            2 => TokenStandard::Fungible,
            3 => TokenStandard::NonFungibleEdition,
            4 => TokenStandard::ProgrammableNonFungible,
            5 => TokenStandard::ProgrammableNonFungibleEdition,
            other => TokenStandard::Unknown(other),
        }
    }
}

// ─── Decoding ─────────────────────────────────────────────────────────────────

/// `Data` as it sits on chain. Strings stay raw bytes until NULs are
/// stripped and invalid UTF-8 is replaced.
#[derive(BorshDeserialize)]
struct RawData {
    name:                    Vec<u8>,
    symbol:                  Vec<u8>,
    uri:                     Vec<u8>,
    seller_fee_basis_points: u16,
    creators:                Option<Vec<Creator>>,
}

impl From<RawData> for Data {
    fn from(raw: RawData) -> Self {
        Data {
            name:   clean_string(&raw.name),
            symbol: clean_string(&raw.symbol),
            uri:    clean_string(&raw.uri),
            seller_fee_basis_points: raw.seller_fee_basis_points,
            creators: raw.creators,
        }
    }
}

fn clean_string(bytes: &[u8]) -> String {
    let mut s = String::from_utf8_lossy(bytes).into_owned();
    s.retain(|c| c != '\0');
    s
}

impl Metadata {
    /// Decode a metadata account from raw bytes.
    ///
    /// Fails with [`Error::MalformedMetadata`] when a required field is
    /// missing or a length prefix runs past the end of `data`. No partial
    /// record is ever returned.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut fields = Fields { data, rest: data };

        let key              = fields.next("key")?;
        let update_authority = fields.next("update_authority")?;
        let mint             = fields.next("mint")?;
        let data_offset      = fields.offset();
        let raw: RawData     = fields.next("data")?;
        let primary_sale_happened = fields.next("primary_sale_happened")?;
        let is_mutable            = fields.next("is_mutable")?;
        let edition_nonce         = fields.next("edition_nonce")?;

        if let Some(creators) = &raw.creators {
            if creators.len() > MAX_CREATOR_LIMIT {
                return Err(Error::MalformedMetadata {
                    offset: data_offset,
                    reason: format!(
                        "{} creators, at most {MAX_CREATOR_LIMIT} allowed",
                        creators.len()
                    ),
                });
            }
        }

        let mut tail = Tail { fields, open: true };
        let token_standard = tail.next::<Option<u8>>("token_standard")
            .flatten()
            .map(TokenStandard::from);
        let collection = tail.next::<Option<Collection>>("collection").flatten();
        let uses       = tail.next::<Option<Uses>>("uses").flatten();

        Ok(Metadata {
            key,
            update_authority,
            mint,
            data: raw.into(),
            primary_sale_happened,
            is_mutable,
            edition_nonce,
            token_standard,
            collection,
            uses,
        })
    }
}

/// Read the candy machine address (first creator) straight from its fixed
/// offset, without decoding anything before it.
///
/// Only valid for the fixed-width layout the program writes, where `name`,
/// `symbol` and `uri` are padded to their maximum lengths and a creators list
/// is present. An account with unpadded strings would place a different
/// value here; use [`Metadata::decode`] when the layout is not guaranteed.
pub fn extract_candy_machine_address(data: &[u8]) -> Result<Pubkey> {
    let end = CANDY_MACHINE_OFFSET + 32;
    let bytes: [u8; 32] = data
        .get(CANDY_MACHINE_OFFSET..end)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::MalformedMetadata {
            offset: CANDY_MACHINE_OFFSET,
            reason: format!("account is {} bytes; candy machine address needs {end}", data.len()),
        })?;
    Ok(Pubkey::new_from_array(bytes))
}

/// Borsh-decodes one top-level field at a time so errors carry the offset
/// of the field that failed. Bytes after the last field read are left alone.
struct Fields<'a> {
    data: &'a [u8],
    rest: &'a [u8],
}

impl Fields<'_> {
    fn offset(&self) -> usize {
        self.data.len() - self.rest.len()
    }

    fn next<T: BorshDeserialize>(&mut self, field: &str) -> Result<T> {
        let offset = self.offset();
        let mut rest = self.rest;
        let value = T::deserialize(&mut rest).map_err(|e| Error::MalformedMetadata {
            offset,
            reason: format!("{field}: {e}"),
        })?;
        self.rest = rest;
        Ok(value)
    }
}

/// Reads the optional trailing fields. The first one that is absent or does
/// not fit closes the tail, and every later field is reported absent too.
struct Tail<'a> {
    fields: Fields<'a>,
    open:   bool,
}

impl Tail<'_> {
    fn next<T: BorshDeserialize>(&mut self, field: &str) -> Option<T> {
        if !self.open {
            return None;
        }
        match self.fields.next(field) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!(%err, "metadata tail ends early");
                self.open = false;
                None
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH, METADATA_V1_KEY,
    };

    fn padded(s: &str, width: usize) -> Vec<u8> {
        let mut out = s.as_bytes().to_vec();
        out.resize(width, 0);
        out
    }

    fn put_string(buf: &mut Vec<u8>, bytes: &[u8]) {
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytes);
    }

    /// A minted-by-candy-machine record up to and including `edition_nonce`.
    fn record(name: &[u8], creators: &[Creator]) -> Vec<u8> {
        let mut buf = vec![METADATA_V1_KEY];
        buf.extend_from_slice(Pubkey::new_from_array([1; 32]).as_ref());
        buf.extend_from_slice(Pubkey::new_from_array([2; 32]).as_ref());
        put_string(&mut buf, name);
        put_string(&mut buf, &padded("FOO", MAX_SYMBOL_LENGTH));
        put_string(&mut buf, &padded("https://arweave.net/abc", MAX_URI_LENGTH));
        buf.extend_from_slice(&500u16.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&(creators.len() as u32).to_le_bytes());
        for c in creators {
            buf.extend_from_slice(c.address.as_ref());
            buf.push(c.verified as u8);
            buf.push(c.share);
        }
        buf.push(1); // primary_sale_happened
        buf.push(1); // is_mutable
        buf.extend_from_slice(&[1, 254]); // edition_nonce = Some(254)
        buf
    }

    fn candy_creators() -> Vec<Creator> {
        vec![
            Creator { address: Pubkey::new_from_array([9; 32]), verified: true, share: 0 },
            Creator { address: Pubkey::new_from_array([8; 32]), verified: false, share: 100 },
        ]
    }

    #[test]
    fn decodes_required_fields() {
        let bytes = record(&padded("Foo #1", MAX_NAME_LENGTH), &candy_creators());
        let md = Metadata::decode(&bytes).unwrap();

        assert_eq!(md.key, METADATA_V1_KEY);
        assert_eq!(md.update_authority, Pubkey::new_from_array([1; 32]));
        assert_eq!(md.mint, Pubkey::new_from_array([2; 32]));
        assert_eq!(md.data.name, "Foo #1");
        assert_eq!(md.data.symbol, "FOO");
        assert_eq!(md.data.uri, "https://arweave.net/abc");
        assert_eq!(md.data.seller_fee_basis_points, 500);
        assert_eq!(md.data.creators, Some(candy_creators()));
        assert!(md.primary_sale_happened);
        assert!(md.is_mutable);
        assert_eq!(md.edition_nonce, Some(254));
        assert_eq!(md.token_standard, None);
        assert_eq!(md.collection, None);
        assert_eq!(md.uses, None);
    }

    #[test]
    fn strips_trailing_and_embedded_nul() {
        let md = Metadata::decode(&record(b"Foo\0\0\0\0", &[])).unwrap();
        assert_eq!(md.data.name, "Foo");

        let md = Metadata::decode(&record(b"Fo\0o", &[])).unwrap();
        assert_eq!(md.data.name, "Foo");
    }

    #[test]
    fn strips_nul_from_symbol_and_uri() {
        let mut bytes = vec![METADATA_V1_KEY];
        bytes.extend_from_slice(&[0; 64]);
        put_string(&mut bytes, b"Foo");
        put_string(&mut bytes, b"F\0O\0O\0\0");
        put_string(&mut bytes, b"https://ar\0weave.net/abc\0\0\0");
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 1, 0]); // no creators, flags, no edition_nonce

        let data = Metadata::decode(&bytes).unwrap().data;
        assert_eq!(data.symbol, "FOO");
        assert_eq!(data.uri, "https://arweave.net/abc");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let md = Metadata::decode(&record(b"Fo\xffo", &[])).unwrap();
        assert_eq!(md.data.name, "Fo\u{fffd}o");
    }

    #[test]
    fn candy_machine_offset_matches_first_creator() {
        let bytes = record(&padded("Foo #1", MAX_NAME_LENGTH), &candy_creators());

        let fast = extract_candy_machine_address(&bytes).unwrap();
        let full = Metadata::decode(&bytes).unwrap();

        assert_eq!(Some(fast), full.data.creators.map(|c| c[0].address));
    }

    #[test]
    fn candy_machine_offset_rejects_short_accounts() {
        let err = extract_candy_machine_address(&[0u8; CANDY_MACHINE_OFFSET + 31]).unwrap_err();
        assert!(matches!(err, Error::MalformedMetadata { offset: CANDY_MACHINE_OFFSET, .. }));
    }

    #[test]
    fn tolerates_trailing_bytes() {
        let mut bytes = record(&padded("Foo", MAX_NAME_LENGTH), &candy_creators());
        let expected = Metadata::decode(&bytes).unwrap();

        // Fixed-size accounts are zero padded: every optional tail field is None.
        bytes.extend_from_slice(&[0u8; 200]);
        assert_eq!(Metadata::decode(&bytes).unwrap(), expected);

        // Garbage that is not a valid tail is ignored as well.
        let mut noisy = record(&padded("Foo", MAX_NAME_LENGTH), &candy_creators());
        noisy.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(Metadata::decode(&noisy).unwrap(), expected);
    }

    #[test]
    fn decodes_extended_tail() {
        let mut bytes = record(b"Foo", &[]);
        bytes.extend_from_slice(&[1, 4]); // token_standard = ProgrammableNonFungible
        bytes.push(1); // collection = Some
        bytes.push(1);
        bytes.extend_from_slice(&[5; 32]);
        bytes.push(1); // uses = Some
        bytes.push(2);
        bytes.extend_from_slice(&3u64.to_le_bytes());
        bytes.extend_from_slice(&10u64.to_le_bytes());
        bytes.extend_from_slice(&[0; 16]); // collection_details and beyond

        let md = Metadata::decode(&bytes).unwrap();
        assert_eq!(md.token_standard, Some(TokenStandard::ProgrammableNonFungible));
        assert_eq!(md.collection, Some(Collection { verified: true, key: Pubkey::new_from_array([5; 32]) }));
        assert_eq!(md.uses, Some(Uses { use_method: 2, remaining: 3, total: 10 }));
    }

    #[test]
    fn truncated_tail_field_reads_as_absent() {
        let mut bytes = record(b"Foo", &[]);
        bytes.extend_from_slice(&[1, 0]); // token_standard = NonFungible
        bytes.extend_from_slice(&[1, 1, 5, 5]); // collection cut short

        let md = Metadata::decode(&bytes).unwrap();
        assert_eq!(md.token_standard, Some(TokenStandard::NonFungible));
        assert_eq!(md.collection, None);
        assert_eq!(md.uses, None);
    }

    #[test]
    fn truncation_before_required_fields_fails() {
        let bytes = record(&padded("Foo", MAX_NAME_LENGTH), &candy_creators());

        // Drop the edition_nonce value, then the whole edition_nonce, then is_mutable.
        for cut in 1..=3 {
            let err = Metadata::decode(&bytes[..bytes.len() - cut]).unwrap_err();
            assert!(matches!(err, Error::MalformedMetadata { .. }), "cut {cut}: {err}");
        }
        assert!(Metadata::decode(&[]).is_err());
        assert!(Metadata::decode(&bytes[..64]).is_err());
    }

    #[test]
    fn oversized_length_prefix_fails() {
        let mut bytes = vec![METADATA_V1_KEY];
        bytes.extend_from_slice(&[0; 64]);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(b"short");

        // Reported at the start of the data block holding the bad prefix.
        let err = Metadata::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedMetadata { offset: 65, .. }));
    }

    #[test]
    fn oversized_creator_count_fails() {
        let mut bytes = record(b"Foo", &[]);
        // creators_tag(1) then len(4) sit right after seller_fee_basis_points.
        let len_at = 1 + 32 + 32 + (4 + 3) + (4 + MAX_SYMBOL_LENGTH) + (4 + MAX_URI_LENGTH) + 2 + 1;
        bytes[len_at..len_at + 4].copy_from_slice(&1_000_000u32.to_le_bytes());

        assert!(matches!(Metadata::decode(&bytes), Err(Error::MalformedMetadata { .. })));
    }

    #[test]
    fn creator_list_is_capped() {
        let creators: Vec<Creator> = (0..=MAX_CREATOR_LIMIT as u8)
            .map(|i| Creator { address: Pubkey::new_from_array([i; 32]), verified: false, share: 0 })
            .collect();
        let err = Metadata::decode(&record(b"Foo", &creators)).unwrap_err();
        assert!(matches!(err, Error::MalformedMetadata { offset: 65, .. }), "{err}");

        let five = &creators[..MAX_CREATOR_LIMIT];
        assert_eq!(Metadata::decode(&record(b"Foo", five)).unwrap().data.creators.unwrap().len(), 5);
    }

    #[test]
    fn invalid_bool_fails() {
        let mut bytes = record(b"Foo", &[]);
        let n = bytes.len();
        bytes[n - 4] = 7; // primary_sale_happened

        assert!(matches!(Metadata::decode(&bytes), Err(Error::MalformedMetadata { .. })));
    }

    #[test]
    fn invalid_option_tag_fails() {
        let mut bytes = record(b"Foo", &[]);
        let n = bytes.len();
        bytes[n - 2] = 7; // edition_nonce tag

        assert!(matches!(Metadata::decode(&bytes), Err(Error::MalformedMetadata { .. })));
    }
}
