//! Note encryption for private transfers.
//!
//! An auxiliary X25519 keypair, independent of the signing key, lets a
//! counterparty seal a transfer note (amount + secret number) to the
//! wallet. Sealing: ephemeral X25519 → HKDF-SHA256 → AES-256-GCM.

use crate::error::CipherError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use curve25519_dalek::montgomery::MontgomeryPoint;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// HKDF info string binding derived keys to this format.
const HKDF_INFO: &[u8] = b"helix-note-encryption-v1";

const NONCE_LEN: usize = 12;
const PUBLIC_LEN: usize = 32;

/// X25519 keypair for receiving sealed transfer notes.
pub struct NoteKeypair {
    secret: Zeroizing<[u8; 32]>,
    public: [u8; 32],
}

impl NoteKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut secret = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(secret.as_mut());
        let public = MontgomeryPoint::mul_base_clamped(*secret).to_bytes();
        Self { secret, public }
    }

    /// Rebuild a keypair from a stored secret key (hex).
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, CipherError> {
        let bytes = hex::decode(secret_hex)
            .map_err(|e| CipherError::Format(format!("invalid secret key hex: {}", e)))?;
        if bytes.len() != 32 {
            return Err(CipherError::Format(format!(
                "secret key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(&bytes);
        let public = MontgomeryPoint::mul_base_clamped(*secret).to_bytes();
        Ok(Self { secret, public })
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.public)
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.as_ref()))
    }

    /// Open a note sealed to this keypair's public key.
    pub fn open(&self, sealed_hex: &str) -> Result<Vec<u8>, CipherError> {
        let data = hex::decode(sealed_hex)
            .map_err(|e| CipherError::Format(format!("invalid sealed note hex: {}", e)))?;
        if data.len() < PUBLIC_LEN + NONCE_LEN {
            return Err(CipherError::Format("sealed note too short".into()));
        }

        let mut ephemeral = [0u8; 32];
        ephemeral.copy_from_slice(&data[..PUBLIC_LEN]);
        let nonce = &data[PUBLIC_LEN..PUBLIC_LEN + NONCE_LEN];
        let ciphertext = &data[PUBLIC_LEN + NONCE_LEN..];

        let shared = MontgomeryPoint(ephemeral).mul_clamped(*self.secret);
        let key_bytes = note_key(shared.as_bytes())?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Authentication)
    }
}

/// Seal a note to a recipient's public key (hex).
///
/// Output: hex of `ephemeral_public(32) || nonce(12) || ciphertext+tag`.
pub fn seal(recipient_public_hex: &str, note: &[u8]) -> Result<String, CipherError> {
    let pub_bytes = hex::decode(recipient_public_hex)
        .map_err(|e| CipherError::Format(format!("invalid public key hex: {}", e)))?;
    if pub_bytes.len() != 32 {
        return Err(CipherError::Format(format!(
            "public key must be 32 bytes, got {}",
            pub_bytes.len()
        )));
    }
    let mut recipient = [0u8; 32];
    recipient.copy_from_slice(&pub_bytes);

    let mut rng = rand::thread_rng();
    let mut eph_secret = Zeroizing::new([0u8; 32]);
    rng.fill_bytes(eph_secret.as_mut());
    let eph_public = MontgomeryPoint::mul_base_clamped(*eph_secret);

    let shared = MontgomeryPoint(recipient).mul_clamped(*eph_secret);
    let key_bytes = note_key(shared.as_bytes())?;

    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), note)
        .map_err(|e| CipherError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(PUBLIC_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(eph_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(hex::encode(out))
}

fn note_key(shared: &[u8]) -> Result<[u8; 32], CipherError> {
    let hk = Hkdf::<Sha256>::new(None, shared);
    let mut key = [0u8; 32];
    hk.expand(HKDF_INFO, &mut key)
        .map_err(|e| CipherError::Encryption(e.to_string()))?;
    Ok(key)
}
