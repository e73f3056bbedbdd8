//! HD account derivation and signing.
//!
//! Wraps the BIP39/BIP44 stack behind the narrow interface the keyring
//! consumes: secret generation, address derivation by index, and
//! message/transaction signing. Same secret + index always yields the
//! same address.

pub mod error;
pub mod hd;
pub mod secret;

pub use error::AccountError;
pub use hd::{derive_address, sign_message, sign_transaction};
pub use secret::{Secret, WalletMode};
