use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{CommandFactory, Parser, Subcommand};
use nft_resolver_sdk::{
    constants::{CANDY_MACHINE_OFFSET, METADATA_PROGRAM_ID},
    extract_candy_machine_address, Creator, Data, Metadata, NftClient,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  NFT Resolver  v{ver}  ·  read-only Solana NFT lookups");
    println!("  {}", "─".repeat(62));
    println!("  Metadata  {METADATA_PROGRAM_ID}");
    println!("  Network   Solana mainnet-beta (override with --rpc-url)");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// NFT Resolver: ownership and Metaplex metadata lookups on Solana.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   NFT_RPC_URL  Solana JSON-RPC endpoint
///   RUST_LOG     log filter for diagnostics on stderr (default: warn)
#[derive(Parser)]
#[command(
    name    = "nft-resolver",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Resolve Solana NFT ownership and Metaplex metadata. Read-only: never signs or sends.",
    after_help = "\
ENVIRONMENT:
  NFT_RPC_URL    Solana JSON-RPC endpoint  [default: https://api.mainnet-beta.solana.com]
  RUST_LOG       Diagnostic log filter, e.g. nft_resolver_sdk=debug

QUICK START:
  nft-resolver list      --owner <WALLET>
  nft-resolver metadata  --mint <MINT>
  nft-resolver owner     --mint <MINT>
  nft-resolver pda       --mint <MINT>"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global     = true,
        value_name = "URL",
        default_value = "https://api.mainnet-beta.solana.com",
        env = "NFT_RPC_URL"
    )]
    rpc_url: String,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the metadata and edition account addresses for a mint
    ///
    /// Pure computation, no RPC call is made.
    #[command(
        after_help = "\
EXAMPLES:
  nft-resolver pda --mint EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v
  nft-resolver pda --mint <MINT> --json"
    )]
    Pda {
        /// Mint address (base-58)
        #[arg(long, value_name = "MINT")]
        mint: String,
    },

    /// List NFTs held by a wallet
    ///
    /// An NFT is any token account holding exactly one unit of a
    /// zero-decimal mint.
    #[command(
        after_help = "\
EXAMPLES:
  nft-resolver list --owner <WALLET>
  nft-resolver list --owner <WALLET> --with-metadata --json"
    )]
    List {
        /// Wallet address (base-58)
        #[arg(long, value_name = "WALLET")]
        owner: String,

        /// Also fetch each NFT's metadata (one extra RPC call per NFT)
        #[arg(long, default_value_t = false)]
        with_metadata: bool,
    },

    /// Fetch and decode the metadata of a mint
    #[command(
        after_help = "\
EXAMPLES:
  nft-resolver metadata --mint <MINT>
  nft-resolver metadata --mint <MINT> --json"
    )]
    Metadata {
        /// Mint address (base-58)
        #[arg(long, value_name = "MINT")]
        mint: String,
    },

    /// Show the wallet currently holding an NFT
    #[command(
        after_help = "\
EXAMPLES:
  nft-resolver owner --mint <MINT>

NOTES:
  Prints nothing-found (exit 0) when no account holds the single unit,
  e.g. the NFT was burned."
    )]
    Owner {
        /// Mint address (base-58)
        #[arg(long, value_name = "MINT")]
        mint: String,
    },

    /// List every metadata record minted by a candy machine
    #[command(
        name = "candy-machine",
        after_help = "\
EXAMPLES:
  nft-resolver candy-machine --address <CANDY_MACHINE>

NOTES:
  Scans the whole metadata program with a memcmp filter at byte 326.
  Many public RPC endpoints reject or throttle getProgramAccounts;
  use a dedicated endpoint via --rpc-url."
    )]
    CandyMachine {
        /// Candy machine address (base-58)
        #[arg(long, value_name = "ADDRESS")]
        address: String,
    },

    /// Show which candy machine minted an NFT
    ///
    /// Fetches only the 32 bytes at offset 326 of the metadata account.
    #[command(name = "minted-by")]
    MintedBy {
        /// Mint address (base-58)
        #[arg(long, value_name = "MINT")]
        mint: String,
    },

    /// Decode a raw metadata account offline
    #[command(
        after_help = "\
EXAMPLES:
  nft-resolver decode --base64 <DATA>
  nft-resolver decode --file metadata.bin --json"
    )]
    Decode {
        /// Account data, base64 encoded
        #[arg(long, value_name = "DATA", conflicts_with = "file", required_unless_present = "file")]
        base64: Option<String>,

        /// File holding raw account bytes
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = NftClient::new(cli.rpc_url.clone());
    tracing::debug!(rpc_url = %client.gateway().url(), "resolver ready");

    match &cli.command {
        Commands::Pda { mint } => cmd_pda(&client, mint, cli.json),
        Commands::List { owner, with_metadata } => {
            cmd_list(&client, owner, *with_metadata, cli.json).await
        }
        Commands::Metadata { mint } => cmd_metadata(&client, mint, cli.json).await,
        Commands::Owner { mint } => cmd_owner(&client, mint, cli.json).await,
        Commands::CandyMachine { address } => cmd_candy_machine(&client, address, cli.json).await,
        Commands::MintedBy { mint } => cmd_minted_by(&client, mint, cli.json).await,
        Commands::Decode { base64, file } => cmd_decode(base64.as_deref(), file.as_deref(), cli.json),
    }
}

// ─── pda ──────────────────────────────────────────────────────────────────────

fn cmd_pda(client: &NftClient, mint: &str, json_output: bool) -> Result<()> {
    let metadata = client.find_metadata_address(mint).context("mint")?;
    let edition = client.find_edition_address(mint).context("mint")?;

    if json_output {
        println!("{}", json!({
            "status":   "ok",
            "command":  "pda",
            "mint":     mint,
            "program":  client.metadata_program().to_string(),
            "metadata": metadata.to_string(),
            "edition":  edition.to_string(),
        }));
    } else {
        println!("─── PDA: {mint} ──────────────────────────────");
        println!("  Metadata   {metadata}");
        println!("  Edition    {edition}");
    }
    Ok(())
}

// ─── list ─────────────────────────────────────────────────────────────────────

async fn cmd_list(client: &NftClient, owner: &str, with_metadata: bool, json_output: bool) -> Result<()> {
    if with_metadata {
        let items = client
            .list_owned_with_metadata(owner)
            .await
            .with_context(|| format!("Failed to list NFTs for {owner}"))?;

        if json_output {
            let nfts: Vec<Value> = items.iter().map(|(nft, data)| json!({
                "account":  nft.account.to_string(),
                "mint":     nft.mint.to_string(),
                "metadata": data_json(data),
            })).collect();
            println!("{}", json!({ "status": "ok", "command": "list", "owner": owner, "nfts": nfts }));
        } else {
            println!("─── NFTs owned by {owner} ───────────────────────");
            for (i, (nft, data)) in items.iter().enumerate() {
                println!("  [{i:>3}]  {}  {}", nft.mint, data.name);
                println!("         {}", data.uri);
            }
            println!();
            println!("  Total: {} NFT(s) with metadata", items.len());
        }
        return Ok(());
    }

    let nfts = client
        .list_owned_nfts(owner)
        .await
        .with_context(|| format!("Failed to list NFTs for {owner}"))?;

    if json_output {
        let items: Vec<Value> = nfts.iter().map(|n| json!({
            "account": n.account.to_string(),
            "mint":    n.mint.to_string(),
        })).collect();
        println!("{}", json!({ "status": "ok", "command": "list", "owner": owner, "nfts": items }));
    } else {
        println!("─── NFTs owned by {owner} ───────────────────────");
        if nfts.is_empty() {
            println!("  No NFTs found.");
        }
        for (i, nft) in nfts.iter().enumerate() {
            println!("  [{i:>3}]  Mint     {}", nft.mint);
            println!("         Account  {}", nft.account);
        }
        println!();
        println!("  Total: {} NFT(s)  ·  run `metadata --mint <MINT>` for details", nfts.len());
    }
    Ok(())
}

// ─── metadata ─────────────────────────────────────────────────────────────────

async fn cmd_metadata(client: &NftClient, mint: &str, json_output: bool) -> Result<()> {
    let address = client.find_metadata_address(mint).context("mint")?;
    let md = client
        .get_metadata_at(&address)
        .await
        .with_context(|| format!("No readable metadata for mint {mint} (account {address})"))?;

    if json_output {
        println!("{}", json!({
            "status":   "ok",
            "command":  "metadata",
            "address":  address.to_string(),
            "metadata": metadata_json(&md),
        }));
    } else {
        println!("─── Metadata: {mint} ──────────────────────────");
        println!("  Account          {address}");
        print_metadata(&md);
    }
    Ok(())
}

// ─── owner ────────────────────────────────────────────────────────────────────

async fn cmd_owner(client: &NftClient, mint: &str, json_output: bool) -> Result<()> {
    let owner = client
        .get_owner(mint)
        .await
        .with_context(|| format!("Failed to look up the holder of {mint}"))?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "owner",
            "mint":    mint,
            "owner":   owner.map(|o| o.to_string()),
        }));
    } else {
        match owner {
            Some(owner) => println!("  {mint}  held by  {owner}"),
            None => println!("  {mint}  has no current holder (burned or not minted)"),
        }
    }
    Ok(())
}

// ─── candy-machine ────────────────────────────────────────────────────────────

async fn cmd_candy_machine(client: &NftClient, address: &str, json_output: bool) -> Result<()> {
    let records = client
        .list_mints_by_authority(address)
        .await
        .with_context(|| format!("getProgramAccounts failed for candy machine {address}"))?;

    if json_output {
        let items: Vec<Value> = records.iter().map(metadata_json).collect();
        println!("{}", json!({
            "status":        "ok",
            "command":       "candy-machine",
            "candy_machine": address,
            "count":         records.len(),
            "records":       items,
        }));
    } else {
        println!("─── Minted by {address} ───────────────────────");
        for (i, md) in records.iter().enumerate() {
            println!("  [{i:>4}]  {}  {}", md.mint, md.data.name);
        }
        println!();
        println!("  Total: {} record(s)", records.len());
    }
    Ok(())
}

// ─── minted-by ────────────────────────────────────────────────────────────────

async fn cmd_minted_by(client: &NftClient, mint: &str, json_output: bool) -> Result<()> {
    let candy_machine = client
        .candy_machine_of(mint)
        .await
        .with_context(|| format!("Failed to read the candy machine of {mint}"))?;

    if json_output {
        println!("{}", json!({
            "status":        "ok",
            "command":       "minted-by",
            "mint":          mint,
            "candy_machine": candy_machine.to_string(),
        }));
    } else {
        println!("  {mint}  minted by  {candy_machine}");
    }
    Ok(())
}

// ─── decode ───────────────────────────────────────────────────────────────────

fn cmd_decode(base64: Option<&str>, file: Option<&std::path::Path>, json_output: bool) -> Result<()> {
    let bytes = match (base64, file) {
        (Some(encoded), _) => STANDARD
            .decode(encoded.trim())
            .context("--base64 is not valid base64")?,
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("Cannot read {}", path.display()))?,
        (None, None) => return Err(anyhow!("Pass --base64 <DATA> or --file <PATH>.")),
    };

    let md = Metadata::decode(&bytes)?;
    // The fixed offset only holds a creator when strings are padded to full width.
    let candy_machine = extract_candy_machine_address(&bytes).ok();

    if json_output {
        println!("{}", json!({
            "status":        "ok",
            "command":       "decode",
            "bytes":         bytes.len(),
            "metadata":      metadata_json(&md),
            "candy_machine": candy_machine.map(|k| k.to_string()),
        }));
    } else {
        println!("─── Decoded {} bytes ───────────────────────────", bytes.len());
        print_metadata(&md);
        if let Some(cm) = candy_machine {
            println!("  @{CANDY_MACHINE_OFFSET:<15} {cm}");
        }
    }
    Ok(())
}

// ─── Output helpers ───────────────────────────────────────────────────────────

fn print_metadata(md: &Metadata) {
    println!("  Mint             {}", md.mint);
    println!("  Update auth      {}", md.update_authority);
    println!("  Name             {}", md.data.name);
    println!("  Symbol           {}", md.data.symbol);
    println!("  URI              {}", md.data.uri);
    println!("  Royalty          {} bps  ({:.2}%)",
             md.data.seller_fee_basis_points, md.data.seller_fee_basis_points as f64 / 100.0);
    println!("  Mutable          {}", if md.is_mutable { "yes" } else { "no" });
    println!("  Primary sale     {}", if md.primary_sale_happened { "done" } else { "pending" });
    if let Some(standard) = md.token_standard {
        println!("  Token standard   {standard:?}");
    }
    if let Some(collection) = md.collection {
        println!("  Collection       {}{}", collection.key,
                 if collection.verified { "  (verified)" } else { "" });
    }
    for c in md.data.creators.iter().flatten() {
        println!("  Creator          {}  {:>3}%{}", c.address, c.share,
                 if c.verified { "  (verified)" } else { "" });
    }
}

fn creator_json(c: &Creator) -> Value {
    json!({ "address": c.address.to_string(), "verified": c.verified, "share": c.share })
}

fn data_json(data: &Data) -> Value {
    json!({
        "name":                    data.name,
        "symbol":                  data.symbol,
        "uri":                     data.uri,
        "seller_fee_basis_points": data.seller_fee_basis_points,
        "creators":                data.creators.as_ref()
            .map(|cs| cs.iter().map(creator_json).collect::<Vec<_>>()),
    })
}

fn metadata_json(md: &Metadata) -> Value {
    json!({
        "key":                   md.key,
        "update_authority":      md.update_authority.to_string(),
        "mint":                  md.mint.to_string(),
        "data":                  data_json(&md.data),
        "primary_sale_happened": md.primary_sale_happened,
        "is_mutable":            md.is_mutable,
        "edition_nonce":         md.edition_nonce,
        "token_standard":        md.token_standard.map(|t| format!("{t:?}")),
        "collection":            md.collection.map(|c| json!({
            "verified": c.verified, "key": c.key.to_string(),
        })),
        "uses":                  md.uses.map(|u| json!({
            "use_method": u.use_method, "remaining": u.remaining, "total": u.total,
        })),
    })
}
