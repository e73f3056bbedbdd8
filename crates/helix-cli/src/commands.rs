//! CLI command implementations.

use crate::book::{self, TokenMeta, TransferNote};
use crate::AppContext;
use helix_account::{Secret, WalletMode};
use helix_keyring::{Keyring, KeyringState};
use helix_store::SecretStore;
use std::io::{BufRead, Write};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn open_keyring(ctx: &AppContext) -> std::result::Result<Keyring, Box<dyn std::error::Error>> {
    log::debug!("opening store at {}", ctx.store_path.display());
    let store = SecretStore::open(&ctx.store_path)?;
    Ok(Keyring::new(store))
}

fn prompt_password(prompt: &str) -> std::result::Result<String, Box<dyn std::error::Error>> {
    let pass = rpassword::prompt_password(prompt)?;
    if pass.is_empty() {
        return Err("password cannot be empty".into());
    }
    Ok(pass)
}

fn prompt_new_password() -> std::result::Result<String, Box<dyn std::error::Error>> {
    let pass = prompt_password("Enter a password for your wallet: ")?;
    if pass.len() < 8 {
        return Err("password must be at least 8 characters".into());
    }
    let confirm = prompt_password("Confirm the password: ")?;
    if pass != confirm {
        return Err("passwords do not match".into());
    }
    Ok(pass)
}

fn prompt_line(prompt: &str) -> std::result::Result<String, Box<dyn std::error::Error>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt for the wallet password and unlock for one operation.
fn unlock_for_operation(
    keyring: &mut Keyring,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if !keyring.wallet_exists() {
        return Err("wallet not found; use 'create' or 'import' first".into());
    }
    let password = prompt_password("Enter your password to unlock your wallet: ")?;
    if !keyring.unlock(&password) {
        // No automatic retry; the operator re-runs the command.
        return Err("incorrect password".into());
    }
    Ok(())
}

// ─── Wallet commands ────────────────────────────────────────────────────────

pub fn create_wallet(ctx: &AppContext, raw_key: bool) -> Result {
    let mut keyring = open_keyring(ctx)?;
    if keyring.wallet_exists() {
        return Err("a wallet already exists; 'remove' it before creating a new one".into());
    }

    let password = prompt_new_password()?;
    let mode = if raw_key {
        WalletMode::RawKey
    } else {
        WalletMode::Mnemonic
    };
    let secret = Keyring::generate_secret(mode);

    if let Some(phrase) = secret.phrase() {
        println!("\nNew recovery phrase generated:\n");
        println!("    {}\n", phrase);
        loop {
            let answer =
                prompt_line("Please save your phrase and don't share it with anyone (type 'yes' to confirm): ")?;
            if answer == "yes" {
                break;
            }
        }
    }

    keyring.persist(&secret, &password)?;

    println!("\nWallet created successfully!");
    if let Some(address) = keyring.active_address() {
        println!("Primary address: {}", address);
    }
    if let Some(public) = keyring.note_encryption_public_key() {
        println!("Note-encryption key: {}", public);
    }
    Ok(())
}

pub fn import_wallet(ctx: &AppContext) -> Result {
    let mut keyring = open_keyring(ctx)?;
    if keyring.wallet_exists() {
        return Err("a wallet already exists; 'remove' it before importing".into());
    }

    let phrase = prompt_line("Enter your 12-word recovery phrase: ")?;
    if !Secret::validate_phrase(&phrase) {
        return Err("invalid recovery phrase".into());
    }
    let secret = Secret::from_phrase(&phrase)?;

    let password = prompt_new_password()?;
    keyring.persist(&secret, &password)?;

    println!("Wallet imported successfully!");
    if let Some(address) = keyring.active_address() {
        println!("Primary address: {}", address);
    }
    Ok(())
}

pub fn wallet_info(ctx: &AppContext) -> Result {
    let keyring = open_keyring(ctx)?;

    println!("Store file:  {}", keyring.store().path().display());
    match keyring.state() {
        KeyringState::NoWallet => {
            println!("Wallet:      not created");
            return Ok(());
        }
        state => println!("Wallet:      {:?}", state),
    }
    println!("Addresses:   {}", keyring.addresses().len());
    if let Some(active) = keyring.active_address() {
        println!("Active:      {}", active);
    }
    if let Some(public) = keyring.note_encryption_public_key() {
        println!("Note key:    {}", public);
    }
    Ok(())
}

pub fn show_addresses(ctx: &AppContext) -> Result {
    let keyring = open_keyring(ctx)?;
    if !keyring.wallet_exists() {
        return Err("wallet not found; use 'create' or 'import' first".into());
    }

    let active = keyring.active_address();
    println!("Addresses:");
    for (index, address) in keyring.addresses().iter().enumerate() {
        let marker = if Some(address) == active.as_ref() {
            " (active)"
        } else {
            ""
        };
        println!("  ({}) {}{}", index, address, marker);
    }
    Ok(())
}

pub fn add_address(ctx: &AppContext) -> Result {
    let mut keyring = open_keyring(ctx)?;
    if !keyring.wallet_exists() {
        return Err("wallet not found; use 'create' or 'import' first".into());
    }

    let password = prompt_password("Enter your password to unlock your wallet: ")?;
    let address = keyring.add_address(&password)?;
    println!("New address: {}", address);
    Ok(())
}

pub fn use_address(ctx: &AppContext, address: &str) -> Result {
    let mut keyring = open_keyring(ctx)?;
    keyring.set_active_address(address)?;
    println!("Active address: {}", address);
    Ok(())
}

pub fn sign_message(ctx: &AppContext, message: &str) -> Result {
    let mut keyring = open_keyring(ctx)?;
    unlock_for_operation(&mut keyring)?;

    let signature = keyring.sign_message(message);
    keyring.lock();
    println!("Signature: {}", signature?);
    Ok(())
}

pub fn sign_tx(ctx: &AppContext, payload_hex: &str) -> Result {
    let payload = hex::decode(payload_hex.trim_start_matches("0x"))
        .map_err(|e| format!("invalid payload hex: {}", e))?;

    let mut keyring = open_keyring(ctx)?;
    unlock_for_operation(&mut keyring)?;

    let signature = keyring.sign_transaction(&payload);
    keyring.lock();
    println!("Signature: {}", signature?);
    Ok(())
}

pub fn remove_wallet(ctx: &AppContext, yes: bool) -> Result {
    let mut keyring = open_keyring(ctx)?;
    if !keyring.wallet_exists() {
        return Err("wallet not found".into());
    }

    if !yes {
        let answer = prompt_line(
            "This deletes the encrypted secret and all addresses (type 'yes' to confirm): ",
        )?;
        if answer != "yes" {
            println!("Aborted.");
            return Ok(());
        }
    }

    keyring.remove_keyring()?;
    println!("Keyring removed.");
    Ok(())
}

// ─── Token book ─────────────────────────────────────────────────────────────

pub fn token_list(ctx: &AppContext, chain: &str) -> Result {
    let keyring = open_keyring(ctx)?;
    let tokens = book::list_tokens(keyring.store(), chain);
    if tokens.is_empty() {
        println!("No tracked tokens on {}.", chain);
        return Ok(());
    }

    println!("Tokens on {}:", chain);
    for (address, meta) in tokens {
        println!(
            "  {}  {} ({}), {} decimals",
            address, meta.name, meta.symbol, meta.decimals
        );
    }
    Ok(())
}

pub fn token_add(
    ctx: &AppContext,
    chain: &str,
    address: &str,
    name: &str,
    symbol: &str,
    decimals: u8,
) -> Result {
    let mut keyring = open_keyring(ctx)?;
    let meta = TokenMeta {
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals,
    };
    book::add_token(keyring.store_mut(), chain, address, meta)?;
    println!("Tracking {} ({}) on {}.", name, symbol, chain);
    Ok(())
}

pub fn token_remove(ctx: &AppContext, chain: &str, address: &str) -> Result {
    let mut keyring = open_keyring(ctx)?;
    book::remove_token(keyring.store_mut(), chain, address)?;
    println!("Stopped tracking {} on {}.", address, chain);
    Ok(())
}

// ─── Transfer notes ─────────────────────────────────────────────────────────

pub fn notes_list(ctx: &AppContext) -> Result {
    let keyring = open_keyring(ctx)?;
    let notes = book::list_notes(keyring.store());
    if notes.is_empty() {
        println!("No transfer notes.");
        return Ok(());
    }

    for note in notes {
        println!("Chain:         {}", note.chain);
        println!("Token address: {}", note.token);
        println!("Amount:        {}", note.amount);
        println!("Secret number: {}", note.secret_number);
        println!("====================================");
    }
    Ok(())
}

pub fn notes_import(
    ctx: &AppContext,
    chain: &str,
    token: &str,
    amount: &str,
    secret: &str,
) -> Result {
    let mut keyring = open_keyring(ctx)?;
    if !keyring.wallet_exists() {
        return Err("wallet not found; use 'create' or 'import' first".into());
    }

    book::import_note(
        keyring.store_mut(),
        TransferNote {
            chain: chain.to_string(),
            token: token.to_string(),
            amount: amount.to_string(),
            secret_number: secret.to_string(),
        },
    )?;
    println!("Note recorded.");
    Ok(())
}

pub fn notes_open(ctx: &AppContext, sealed: &str) -> Result {
    let mut keyring = open_keyring(ctx)?;
    unlock_for_operation(&mut keyring)?;

    let note = keyring.open_note(sealed);
    keyring.lock();
    let note = note?;
    println!("Note: {}", String::from_utf8_lossy(&note));
    Ok(())
}

pub fn notes_seal(recipient_public_hex: &str, note: &str) -> Result {
    let sealed = helix_crypto::notebox::seal(recipient_public_hex, note.as_bytes())?;
    println!("Sealed note: {}", sealed);
    Ok(())
}
