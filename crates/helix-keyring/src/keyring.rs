//! The keyring.
//!
//! Owns the secret store and moves a wallet through its lifecycle:
//! `NoWallet -> Locked <-> Unlocked`. Every mutation is flushed to the
//! store before the call returns; unlock state never leaves the process.

use crate::error::KeyringError;
use helix_account::{derive_address, sign_message, sign_transaction, Secret, WalletMode};
use helix_crypto::{cipher, notebox::NoteKeypair, personal_hash};
use helix_store::SecretStore;
use log::info;
use serde_json::{json, Map, Value};
use zeroize::Zeroizing;

// Record fields owned by the keyring.
const PASSWORD_HASH: &str = "password_hash";
const ENCRYPTED_SECRET: &str = "encrypted_secret";
const ADDRESSES: &str = "addresses";
const ACTIVE_ADDRESS: &str = "active_address";
const ENCRYPTION_PUBLIC_KEY: &str = "encryption_public_key";
const ENCRYPTION_PRIVATE_KEY: &str = "encryption_private_key";

/// Lifecycle state of the keyring.
///
/// A fresh process always starts in `NoWallet` or `Locked`; `Unlocked` is
/// only reachable through [`Keyring::unlock`] and is lost on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyringState {
    NoWallet,
    Locked,
    Unlocked,
}

/// Wallet keyring bound to one secret store.
pub struct Keyring {
    store: SecretStore,
    /// The unlock password, cached only while unlocked. This is the only
    /// decryption key ever held in memory; the decrypted secret itself is
    /// dropped at the end of each operation.
    cached_password: Option<Zeroizing<String>>,
}

impl Keyring {
    pub fn new(store: SecretStore) -> Self {
        Self {
            store,
            cached_password: None,
        }
    }

    /// Generate a fresh master secret. Pure: nothing is persisted.
    pub fn generate_secret(mode: WalletMode) -> Secret {
        Secret::generate(mode)
    }

    /// Whether a wallet has been created or imported.
    pub fn wallet_exists(&self) -> bool {
        self.store.get(ENCRYPTED_SECRET).is_some()
    }

    pub fn state(&self) -> KeyringState {
        if !self.wallet_exists() {
            KeyringState::NoWallet
        } else if self.cached_password.is_some() {
            KeyringState::Unlocked
        } else {
            KeyringState::Locked
        }
    }

    /// Check a password against the stored verification hash.
    ///
    /// Hash equality only; no decryption is attempted.
    pub fn validate_password(&self, password: &str) -> bool {
        match self.store.get(PASSWORD_HASH).and_then(|v| v.as_str()) {
            Some(stored) => stored == personal_hash(password),
            None => false,
        }
    }

    /// Encrypt and persist a new wallet secret.
    ///
    /// Derives the primary address (index 0) and writes the full record.
    /// Raw-key wallets additionally get an X25519 note-encryption keypair;
    /// its secret half is wrapped by the cipher engine like the master
    /// secret. Fails with [`KeyringError::WalletExists`] if a wallet is
    /// already present.
    pub fn persist(&mut self, secret: &Secret, password: &str) -> Result<(), KeyringError> {
        if self.wallet_exists() {
            return Err(KeyringError::WalletExists);
        }

        let address = derive_address(secret, 0)?;
        let blob = cipher::encrypt(&secret.to_plaintext(), password)?;

        let mut partial = Map::new();
        partial.insert(PASSWORD_HASH.into(), json!(personal_hash(password)));
        partial.insert(ENCRYPTED_SECRET.into(), json!(blob));
        partial.insert(ADDRESSES.into(), json!([address]));
        partial.insert(ACTIVE_ADDRESS.into(), json!(address));

        if secret.mode() == WalletMode::RawKey {
            let keypair = NoteKeypair::generate();
            let wrapped = cipher::encrypt(&keypair.secret_hex(), password)?;
            partial.insert(ENCRYPTION_PUBLIC_KEY.into(), json!(keypair.public_hex()));
            partial.insert(ENCRYPTION_PRIVATE_KEY.into(), json!(wrapped));
        }

        self.store.set_data(partial);
        self.store.save()?;
        info!("wallet created, primary address {}", address);
        Ok(())
    }

    /// Derive the next address and make it active.
    ///
    /// Indices are dense and monotonically increasing: the new index is
    /// always the current list length.
    pub fn add_address(&mut self, password: &str) -> Result<String, KeyringError> {
        if !self.validate_password(password) {
            return Err(KeyringError::IncorrectPassword);
        }

        let secret = self.decrypt_secret(password)?;
        let mut addresses = self.addresses();
        let index = addresses.len() as u32;
        let address = derive_address(&secret, index)?;
        addresses.push(address.clone());

        self.store.set(ADDRESSES, json!(addresses));
        self.store.set(ACTIVE_ADDRESS, json!(address));
        self.store.save()?;
        info!("derived address {} at index {}", address, index);
        Ok(address)
    }

    /// All derived addresses, in derivation-index order.
    pub fn addresses(&self) -> Vec<String> {
        match self.store.get(ADDRESSES) {
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The currently selected signing identity.
    pub fn active_address(&self) -> Option<String> {
        self.store
            .get(ACTIVE_ADDRESS)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    }

    /// Select a different signing identity from the derived addresses.
    pub fn set_active_address(&mut self, address: &str) -> Result<(), KeyringError> {
        if !self.addresses().iter().any(|a| a == address) {
            return Err(KeyringError::UnknownAddress(address.to_owned()));
        }
        self.store.set(ACTIVE_ADDRESS, json!(address));
        self.store.save()?;
        Ok(())
    }

    /// Validate the password and cache it for signing.
    ///
    /// Returns `false` (state unchanged) on a bad password.
    pub fn unlock(&mut self, password: &str) -> bool {
        if !self.validate_password(password) {
            return false;
        }
        self.cached_password = Some(Zeroizing::new(password.to_owned()));
        true
    }

    /// Drop the cached password.
    pub fn lock(&mut self) {
        self.cached_password = None;
    }

    pub fn is_unlocked(&self) -> bool {
        self.cached_password.is_some()
    }

    /// Sign a personal message with the active address.
    ///
    /// Requires an unlocked keyring; the secret is decrypted for this one
    /// call and dropped again.
    pub fn sign_message(&self, message: &str) -> Result<String, KeyringError> {
        let password = self.cached_password.as_ref().ok_or(KeyringError::Locked)?;
        let secret = self.decrypt_secret(password)?;
        Ok(sign_message(&secret, self.active_index(), message)?)
    }

    /// Sign a prepared transaction payload with the active address.
    pub fn sign_transaction(&self, payload: &[u8]) -> Result<String, KeyringError> {
        let password = self.cached_password.as_ref().ok_or(KeyringError::Locked)?;
        let secret = self.decrypt_secret(password)?;
        Ok(sign_transaction(&secret, self.active_index(), payload)?)
    }

    /// Public half of the note-encryption keypair, if this wallet has one.
    pub fn note_encryption_public_key(&self) -> Option<String> {
        self.store
            .get(ENCRYPTION_PUBLIC_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    }

    /// Open a transfer note sealed to this wallet's note-encryption key.
    pub fn open_note(&self, sealed_hex: &str) -> Result<Vec<u8>, KeyringError> {
        let password = self.cached_password.as_ref().ok_or(KeyringError::Locked)?;
        let wrapped = self
            .store
            .get(ENCRYPTION_PRIVATE_KEY)
            .and_then(|v| v.as_str())
            .ok_or(KeyringError::NoNoteKeypair)?;

        let secret_hex = Zeroizing::new(cipher::decrypt_str(wrapped, password)?);
        let keypair = NoteKeypair::from_secret_hex(&secret_hex)?;
        Ok(keypair.open(sealed_hex)?)
    }

    /// Delete all key-bearing fields and forget the cached password.
    ///
    /// Collaborator-owned fields (token book, transfer notes) survive.
    pub fn remove_keyring(&mut self) -> Result<(), KeyringError> {
        for key in [
            PASSWORD_HASH,
            ENCRYPTED_SECRET,
            ADDRESSES,
            ACTIVE_ADDRESS,
            ENCRYPTION_PUBLIC_KEY,
            ENCRYPTION_PRIVATE_KEY,
        ] {
            self.store.remove(key);
        }
        self.lock();
        self.store.save()?;
        info!("keyring removed");
        Ok(())
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SecretStore {
        &mut self.store
    }

    /// Derivation index of the active address (its position in the list).
    fn active_index(&self) -> u32 {
        match self.active_address() {
            Some(active) => self
                .addresses()
                .iter()
                .position(|a| *a == active)
                .unwrap_or(0) as u32,
            None => 0,
        }
    }

    fn decrypt_secret(&self, password: &str) -> Result<Secret, KeyringError> {
        let blob = self
            .store
            .get(ENCRYPTED_SECRET)
            .and_then(|v| v.as_str())
            .ok_or(KeyringError::NoWallet)?;
        let plaintext = Zeroizing::new(cipher::decrypt_str(blob, password)?);
        Ok(Secret::from_plaintext(&plaintext)?)
    }
}
