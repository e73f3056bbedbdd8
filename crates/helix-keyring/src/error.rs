//! Keyring error types.

use helix_account::AccountError;
use helix_crypto::CipherError;
use helix_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("a wallet already exists in this store")]
    WalletExists,

    #[error("no wallet has been created yet")]
    NoWallet,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("keyring is locked")]
    Locked,

    #[error("address {0} is not part of this wallet")]
    UnknownAddress(String),

    #[error("this wallet has no note-encryption keypair")]
    NoNoteKeypair,

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
