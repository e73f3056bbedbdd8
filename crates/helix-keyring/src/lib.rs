//! Keyring lifecycle for the Helix wallet.
//!
//! The keyring is the only component that handles the decrypted master
//! secret or the wallet password, and only transiently: the secret is
//! re-decrypted for each signing operation and the password is cached in
//! memory only while the keyring is unlocked.

pub mod error;
pub mod keyring;

pub use error::KeyringError;
pub use keyring::{Keyring, KeyringState};
