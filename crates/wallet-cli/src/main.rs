//! `solwallet`: command-line front-end for the wallet core.
//!
//! Each subcommand stands in for one action on one of the four screens.
//! State persists in a JSON file between invocations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chain_sol::RpcClient;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_core::balance::fetch_once;
use wallet_core::mnemonic::is_valid_word;
use wallet_core::{
    BalancePoller, BalanceSource, FileStore, KeyValueStore, MnemonicLength, Navigation, Notice,
    Route, RpcTransferSubmitter, Wallet, WalletConfig, WalletError, WalletSession,
};

#[derive(Parser)]
#[command(name = "solwallet")]
#[command(about = "Solana HD wallet: seed phrase, derived accounts, balances and transfers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON-RPC endpoint (overrides SOLANA_RPC_URL / SOLANA_CLUSTER)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Wallet data file (overrides WALLET_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Per-request RPC timeout in seconds (overrides RPC_TIMEOUT_SECS)
    #[arg(long, global = true)]
    rpc_timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and save a new seed phrase
    Generate {
        /// Phrase length (12 or 24)
        #[arg(long, default_value_t = 12)]
        words: usize,
    },

    /// Save a seed phrase you already have
    Import {
        /// The phrase, as separate words or one quoted string
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },

    /// Derive the next wallet from the saved seed
    Add { name: String },

    /// List wallets
    List {
        /// Print secret keys instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// Show balances
    Balance {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,

        /// Only this wallet
        #[arg(long)]
        name: Option<String>,
    },

    /// Pick the wallet the next `send` spends from
    Use { name: String },

    /// Send SOL
    Send {
        /// Destination address
        #[arg(long)]
        to: String,

        /// Amount in SOL
        #[arg(long)]
        amount: f64,

        /// Sending wallet (defaults to the one picked with `use`)
        #[arg(long)]
        from: Option<String>,
    },

    /// Erase the seed phrase and all wallets
    Clear,

    /// Show which screen a path resolves to
    Route { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = WalletConfig::from_env()?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if let Some(secs) = cli.rpc_timeout {
        config.rpc_timeout = Duration::from_secs(secs);
    }
    if let Some(path) = cli.store {
        config.store_path = path;
    }
    config.validate()?;
    tracing::debug!(
        rpc = %config.rpc_url,
        store = %config.store_path.display(),
        "configuration loaded"
    );

    if let Commands::Route { path } = &cli.command {
        let route = Route::resolve(path);
        println!("{path} -> {route} ({route:?})");
        return Ok(());
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&config.store_path)
            .with_context(|| format!("opening {}", config.store_path.display()))?,
    );
    let mut session = WalletSession::open(store)?;

    match cli.command {
        Commands::Generate { words } => generate(&mut session, words)?,
        Commands::Import { phrase } => import(&mut session, &phrase.join(" "))?,
        Commands::Add { name } => {
            let wallet = report(session.add_wallet(&name))?;
            println!("{}", Notice::wallet_added(&wallet.name));
            println!("{}", wallet.public_key);
        }
        Commands::List { show_secrets } => list(&session, show_secrets),
        Commands::Balance { watch, name } => {
            let wallets = select_wallets(&session, name.as_deref())?;
            let client = Arc::new(config.rpc_client()?);
            if watch {
                watch_balances(client, &wallets, &config).await?;
            } else {
                for wallet in &wallets {
                    let display = fetch_once(client.as_ref(), &wallet.public_key).await;
                    println!("{:<16} {}  {}", wallet.name, wallet.public_key, display);
                }
            }
        }
        Commands::Use { name } => {
            let index = wallet_index(&session, &name)?;
            session.hand_off(index)?;
            println!("Next transfer will be sent from \"{name}\"");
        }
        Commands::Send { to, amount, from } => {
            let navigation = match from {
                Some(name) => session.send_from(wallet_index(&session, &name)?)?,
                None => Navigation::to(Route::Send),
            };
            let screen = session.open_transfer(&navigation)?;
            if screen.sender_key().is_none() {
                bail!("no sending wallet: pass --from <name> or run `solwallet use <name>` first");
            }
            let submitter = RpcTransferSubmitter::new(config.rpc_client()?, config.confirm_timeout);
            let signature = report(screen.submit(&submitter, &to, amount).await)?;
            println!("{}", Notice::transfer_succeeded(&signature));
        }
        Commands::Clear => {
            session.clear_all()?;
            println!("All wallet data cleared");
        }
        Commands::Route { .. } => {}
    }

    Ok(())
}

/// Print the user-facing notice for a failure before propagating it.
fn report<T>(result: Result<T, WalletError>) -> Result<T> {
    result.map_err(|e| {
        eprintln!("{}", Notice::from(&e));
        anyhow!(e)
    })
}

fn generate(session: &mut WalletSession, words: usize) -> Result<()> {
    let length = MnemonicLength::from_word_count(words)
        .ok_or_else(|| anyhow!("--words must be 12 or 24, got {words}"))?;
    let seed = report(session.generate_seed(length))?;
    for (row, chunk) in seed.words().chunks(3).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, word)| format!("{:>2}. {:<10}", row * 3 + col + 1, word))
            .collect();
        println!("{}", cells.join(" "));
    }
    session.save_seed(seed)?;
    println!("\nSeed phrase saved. Write it down, then run `solwallet add <name>`.");
    Ok(())
}

fn import(session: &mut WalletSession, phrase: &str) -> Result<()> {
    let seed = report(session.import_seed(phrase))?;
    if !seed.is_valid_bip39() {
        let words = seed.words();
        let unknown = unknown_words(&words);
        if unknown.is_empty() {
            eprintln!(
                "warning: not a valid BIP-39 phrase (bad checksum or length); \
                 adding wallets will fail"
            );
        } else {
            eprintln!(
                "warning: not BIP-39 words: {}; adding wallets will fail",
                unknown.join(", ")
            );
        }
    }
    println!("Seed phrase saved ({} words)", seed.words().len());
    Ok(())
}

fn unknown_words<'a>(words: &[&'a str]) -> Vec<&'a str> {
    words.iter().copied().filter(|w| !is_valid_word(w)).collect()
}

fn list(session: &WalletSession, show_secrets: bool) {
    if session.wallets().is_empty() {
        println!("No wallets yet");
        return;
    }
    for (i, wallet) in session.wallets().iter().enumerate() {
        let secret = if show_secrets {
            wallet.secret_key.as_str()
        } else {
            wallet.masked_secret()
        };
        println!("{i:>3}  {:<16} {}  {}", wallet.name, wallet.public_key, secret);
    }
}

fn wallet_index(session: &WalletSession, name: &str) -> Result<usize> {
    session
        .wallets()
        .iter()
        .position(|w| w.name == name.trim())
        .ok_or_else(|| anyhow!("no wallet named \"{name}\""))
}

fn select_wallets(session: &WalletSession, name: Option<&str>) -> Result<Vec<Wallet>> {
    match name {
        Some(name) => {
            let wallet = session
                .registry()
                .find_by_name(name)
                .ok_or_else(|| anyhow!("no wallet named \"{name}\""))?;
            Ok(vec![wallet.clone()])
        }
        None => Ok(session.wallets().to_vec()),
    }
}

async fn watch_balances(
    source: Arc<RpcClient>,
    wallets: &[Wallet],
    config: &WalletConfig,
) -> Result<()> {
    let source: Arc<dyn BalanceSource> = source;
    let (tx, mut rx) = mpsc::channel(16);

    // One poll per wallet, fanned into a single printer.
    let mut forwarders = Vec::with_capacity(wallets.len());
    for wallet in wallets {
        let poller = BalancePoller::new(
            Arc::clone(&source),
            wallet.public_key.clone(),
            config.poll_interval,
        )?;
        let mut handle = poller.start();
        let tx = tx.clone();
        let name = wallet.name.clone();
        forwarders.push(tokio::spawn(async move {
            while handle.next().await.is_some() {
                if tx.send((name.clone(), handle.latest().clone())).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    loop {
        tokio::select! {
            reading = rx.recv() => match reading {
                Some((name, display)) => println!("{name:<16} {display}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    for forwarder in forwarders {
        forwarder.abort();
    }
    Ok(())
}
