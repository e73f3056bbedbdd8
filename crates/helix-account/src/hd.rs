//! Address derivation and signing.
//!
//! Mnemonic wallets follow the standard Ethereum path `m/44'/60'/0'/0/i`
//! (BIP39 seed with empty passphrase, BIP44 via secp256k1); raw-key
//! wallets hold exactly one keypair at index 0. Addresses are rendered
//! with the EIP-55 mixed-case checksum.

use crate::error::AccountError;
use crate::secret::Secret;
use bip32::XPrv;
use bip39::Seed;
use helix_crypto::{keccak256, personal_hash_bytes};
use k256::ecdsa::SigningKey;

fn signing_key(secret: &Secret, index: u32) -> Result<SigningKey, AccountError> {
    match secret {
        Secret::Mnemonic(mnemonic) => {
            let seed = Seed::new(mnemonic, "");
            let path = format!("m/44'/60'/0'/0/{}", index)
                .parse()
                .map_err(|e: bip32::Error| AccountError::Derivation(e.to_string()))?;
            let xprv = XPrv::derive_from_path(seed.as_bytes(), &path)
                .map_err(|e| AccountError::Derivation(e.to_string()))?;
            let secret_bytes = xprv.to_bytes();
            SigningKey::from_bytes(&secret_bytes.into())
                .map_err(|e| AccountError::InvalidKey(e.to_string()))
        }
        Secret::RawKey(key) => {
            if index != 0 {
                return Err(AccountError::UnsupportedDerivation(index));
            }
            SigningKey::from_bytes(&(**key).into())
                .map_err(|e| AccountError::InvalidKey(e.to_string()))
        }
    }
}

/// Derive the address at `index`. Deterministic for a given secret.
pub fn derive_address(secret: &Secret, index: u32) -> Result<String, AccountError> {
    let key = signing_key(secret, index)?;
    let point = key.verifying_key().to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Ok(to_checksum_address(&digest[12..]))
}

/// Sign a personal message (EIP-191) with the keypair at `index`.
///
/// Returns the 65-byte `r || s || v` signature as 0x-hex, v in {27, 28}.
pub fn sign_message(secret: &Secret, index: u32, message: &str) -> Result<String, AccountError> {
    let digest = personal_hash_bytes(message.as_bytes());
    sign_digest(secret, index, &digest)
}

/// Sign a prepared transaction payload with the keypair at `index`.
///
/// The payload is the serialized transaction produced by the chain
/// collaborator; this signs its keccak-256 digest.
pub fn sign_transaction(secret: &Secret, index: u32, payload: &[u8]) -> Result<String, AccountError> {
    let digest = keccak256(payload);
    sign_digest(secret, index, &digest)
}

fn sign_digest(secret: &Secret, index: u32, digest: &[u8; 32]) -> Result<String, AccountError> {
    let key = signing_key(secret, index)?;
    let (signature, recovery) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| AccountError::Signing(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery.to_byte();
    Ok(format!("0x{}", hex::encode(out)))
}

/// EIP-55 mixed-case checksum encoding of a 20-byte address.
fn to_checksum_address(bytes: &[u8]) -> String {
    let lower = hex::encode(bytes);
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let nibble = (digest[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}
