//! Account error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid entropy: {0}")]
    InvalidEntropy(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("raw-key wallets have a single keypair; index {0} cannot be derived")]
    UnsupportedDerivation(u32),

    #[error("derivation failed: {0}")]
    Derivation(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("unrecognized secret payload")]
    MalformedSecret,
}
