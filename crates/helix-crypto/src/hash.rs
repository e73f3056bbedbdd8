//! Keccak-256 hashing helpers.
//!
//! `personal_hash` implements the EIP-191 personal-message scheme used for
//! password verification and message signing: the message is prefixed with
//! `"\x19Ethereum Signed Message:\n" + length` before hashing.

use tiny_keccak::{Hasher, Keccak};

const PERSONAL_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// EIP-191 personal-message digest.
pub fn personal_hash_bytes(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(PERSONAL_PREFIX);
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// EIP-191 personal-message digest as a 0x-prefixed hex string.
///
/// Used as the stored password verification hash. Note this is a plain
/// message digest with no salt of its own; the salted KDF protects the
/// encrypted secret itself.
pub fn personal_hash(message: &str) -> String {
    format!("0x{}", hex::encode(personal_hash_bytes(message.as_bytes())))
}
