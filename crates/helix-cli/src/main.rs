use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod book;
mod commands;

/// Helix wallet command-line interface.
#[derive(Parser)]
#[command(name = "helix")]
#[command(about = "Helix crypto wallet terminal")]
#[command(version)]
struct Cli {
    /// Storage file path (defaults to ~/.helix-wallet/storage.json).
    #[arg(long)]
    store_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet.
    Create {
        /// Generate a single raw private key instead of a recovery phrase.
        #[arg(long)]
        raw_key: bool,
    },

    /// Import a wallet from a 12-word recovery phrase.
    Import,

    /// Show wallet status.
    Info,

    /// List derived addresses and the active address.
    Address,

    /// Derive the next address and make it active.
    AddAddress,

    /// Select the active address.
    UseAddress {
        /// One of the wallet's derived addresses.
        address: String,
    },

    /// Sign a personal message with the active address.
    SignMessage {
        message: String,
    },

    /// Sign a prepared transaction payload.
    SignTx {
        /// Hex-encoded transaction payload built by the chain tooling.
        payload: String,
    },

    /// Manage the tracked-token list.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage imported private-transfer notes.
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Delete all key material from the store.
    Remove {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// List tracked tokens for a chain.
    List {
        #[arg(long, default_value = "mainnet")]
        chain: String,
    },

    /// Track a token.
    Add {
        #[arg(long, default_value = "mainnet")]
        chain: String,

        /// Token contract address.
        #[arg(long)]
        address: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value = "18")]
        decimals: u8,
    },

    /// Stop tracking a token.
    Remove {
        #[arg(long, default_value = "mainnet")]
        chain: String,

        #[arg(long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum NotesAction {
    /// List imported transfer notes.
    List,

    /// Record a transfer note.
    Import {
        #[arg(long, default_value = "mainnet")]
        chain: String,

        /// Token contract address (zero address for the native token).
        #[arg(long)]
        token: String,

        #[arg(long)]
        amount: String,

        /// The note's secret number.
        #[arg(long)]
        secret: String,
    },

    /// Decrypt a note sealed to this wallet's note-encryption key.
    Open {
        /// Hex blob produced by the counterparty.
        sealed: String,
    },

    /// Seal a note to a counterparty's note-encryption key.
    Seal {
        /// Recipient's note-encryption public key (hex).
        #[arg(long)]
        to: String,

        /// Note contents (e.g. "amount/secret").
        note: String,
    },
}

/// Application context shared across commands.
struct AppContext {
    store_path: PathBuf,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Self {
        let store_path = cli
            .store_file
            .clone()
            .unwrap_or_else(helix_store::SecretStore::default_path);
        Self { store_path }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let ctx = AppContext::from_cli(&cli);

    let result = match cli.command {
        Commands::Create { raw_key } => commands::create_wallet(&ctx, raw_key),
        Commands::Import => commands::import_wallet(&ctx),
        Commands::Info => commands::wallet_info(&ctx),
        Commands::Address => commands::show_addresses(&ctx),
        Commands::AddAddress => commands::add_address(&ctx),
        Commands::UseAddress { address } => commands::use_address(&ctx, &address),
        Commands::SignMessage { message } => commands::sign_message(&ctx, &message),
        Commands::SignTx { payload } => commands::sign_tx(&ctx, &payload),
        Commands::Token { action } => match action {
            TokenAction::List { chain } => commands::token_list(&ctx, &chain),
            TokenAction::Add {
                chain,
                address,
                name,
                symbol,
                decimals,
            } => commands::token_add(&ctx, &chain, &address, &name, &symbol, decimals),
            TokenAction::Remove { chain, address } => {
                commands::token_remove(&ctx, &chain, &address)
            }
        },
        Commands::Notes { action } => match action {
            NotesAction::List => commands::notes_list(&ctx),
            NotesAction::Import {
                chain,
                token,
                amount,
                secret,
            } => commands::notes_import(&ctx, &chain, &token, &amount, &secret),
            NotesAction::Open { sealed } => commands::notes_open(&ctx, &sealed),
            NotesAction::Seal { to, note } => commands::notes_seal(&to, &note),
        },
        Commands::Remove { yes } => commands::remove_wallet(&ctx, yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
