//! Crypto error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("not encrypted by this scheme: {0}")]
    Format(String),

    #[error("decryption failed (wrong password or corrupted data)")]
    Authentication,

    #[error("encryption error: {0}")]
    Encryption(String),
}
