//! End-to-end wallet lifecycle against a real storage file.

use helix_account::WalletMode;
use helix_keyring::{Keyring, KeyringError, KeyringState};
use helix_store::SecretStore;
use std::path::PathBuf;

const PASSWORD: &str = "lifecycle-pw-1";

fn storage_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("wallet").join("storage.json")
}

fn open(dir: &tempfile::TempDir) -> Keyring {
    Keyring::new(SecretStore::open(storage_path(dir)).unwrap())
}

#[test]
fn full_lifecycle_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    // Session 1: create the wallet and derive a second address.
    let (first, second) = {
        let mut keyring = open(&dir);
        assert_eq!(keyring.state(), KeyringState::NoWallet);

        let secret = Keyring::generate_secret(WalletMode::Mnemonic);
        keyring.persist(&secret, PASSWORD).unwrap();
        let first = keyring.active_address().unwrap();
        let second = keyring.add_address(PASSWORD).unwrap();
        assert_ne!(first, second);
        (first, second)
    };

    // Session 2: everything is back, but locked.
    {
        let mut keyring = open(&dir);
        assert_eq!(keyring.state(), KeyringState::Locked);
        assert_eq!(keyring.addresses(), vec![first.clone(), second.clone()]);
        assert_eq!(keyring.active_address().as_deref(), Some(second.as_str()));

        assert!(matches!(
            keyring.sign_message("hi"),
            Err(KeyringError::Locked)
        ));
        assert!(keyring.unlock(PASSWORD));
        let sig_active = keyring.sign_message("hi").unwrap();

        // Switching the active address changes the signing key.
        keyring.set_active_address(&first).unwrap();
        let sig_first = keyring.sign_message("hi").unwrap();
        assert_ne!(sig_active, sig_first);
    }

    // Session 3: remove, then start over.
    {
        let mut keyring = open(&dir);
        keyring.remove_keyring().unwrap();
        assert_eq!(keyring.state(), KeyringState::NoWallet);

        let secret = Keyring::generate_secret(WalletMode::Mnemonic);
        keyring.persist(&secret, PASSWORD).unwrap();
        assert_ne!(keyring.active_address().unwrap(), first);
    }
}

#[test]
fn raw_key_wallet_note_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut keyring = open(&dir);

    let secret = Keyring::generate_secret(WalletMode::RawKey);
    keyring.persist(&secret, PASSWORD).unwrap();
    let public = keyring.note_encryption_public_key().unwrap();

    // Counterparty side: seal a transfer note to the published key.
    let sealed = helix_crypto::notebox::seal(&public, b"2500000000000000000/99421").unwrap();

    // Reopen (fresh session), unlock, open the note.
    drop(keyring);
    let mut keyring = open(&dir);
    assert!(keyring.unlock(PASSWORD));
    let note = keyring.open_note(&sealed).unwrap();
    assert_eq!(note, b"2500000000000000000/99421");
}
