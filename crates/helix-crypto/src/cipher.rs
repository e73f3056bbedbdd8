//! Password-based secret encryption.
//!
//! Encrypts wallet secrets using PBKDF2-HMAC-SHA512 key derivation +
//! AES-256-GCM. The blob is self-contained: everything needed for
//! decryption except the password travels with the ciphertext as
//!
//! ```text
//! "enc::" + hex( salt(64) || iv(16) || tag(16) || iterations(5, ASCII) || ciphertext )
//! ```
//!
//! The format is shared with the JavaScript wallet, so the layout and the
//! iteration-count handling must not change.

use crate::error::CipherError;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::{Rng, RngCore};
use sha2::Sha512;

/// Marker identifying a blob produced by this scheme.
const ENCRYPTED_PREFIX: &str = "enc::";

const SALT_LEN: usize = 64;
const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;
/// The iteration count is stored as exactly five ASCII digits.
const ITER_FIELD_LEN: usize = 5;
const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN + ITER_FIELD_LEN;

const MIN_ITERATIONS: u32 = 10_000;
const MAX_ITERATIONS: u32 = 99_999;

/// AES-256-GCM with the scheme's 16-byte IV (J0 is GHASH-derived per the
/// GCM spec for non-96-bit IVs, matching Node's `createCipheriv`).
type Aes256GcmLongIv = AesGcm<Aes256, U16>;

/// Decryption result: the recovered string, JSON-parsed when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Plaintext {
    /// The recovered string parsed as structured JSON.
    Json(serde_json::Value),
    /// The recovered string as-is.
    Text(String),
}

/// Effective PBKDF2 round count for a stored iteration field.
///
/// Both sides of the format compute the real round count as a fixed f64
/// transform of the stored value; the stored field alone does not reveal
/// the KDF cost. Must match `Math.floor(iterations * 0.47 + 1337)` exactly.
fn kdf_rounds(iterations: u32) -> u32 {
    (iterations as f64 * 0.47 + 1337.0).floor() as u32
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, kdf_rounds(iterations), &mut key);
    key
}

/// Encrypt a plaintext string with a password.
///
/// Returns the complete `enc::`-prefixed hex blob.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, CipherError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    // Randomized so the persisted cost field is not a fixed, known constant.
    let iterations: u32 = rng.gen_range(MIN_ITERATIONS..=MAX_ITERATIONS);

    let key_bytes = derive_key(password, &salt, iterations);
    let key = Key::<Aes256GcmLongIv>::from_slice(&key_bytes);
    let cipher = Aes256GcmLongIv::new(key);
    let nonce = Nonce::<U16>::from_slice(&iv);

    // The AEAD returns ciphertext with the tag appended; the wire format
    // wants the tag between the header and the ciphertext.
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CipherError::Encryption(e.to_string()))?;
    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    let ciphertext = sealed;

    let mut payload = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&tag);
    payload.extend_from_slice(iterations.to_string().as_bytes());
    payload.extend_from_slice(&ciphertext);

    Ok(format!("{}{}", ENCRYPTED_PREFIX, hex::encode(payload)))
}

/// Encrypt a structured value: serialized to a JSON string, then encrypted.
pub fn encrypt_value(value: &serde_json::Value, password: &str) -> Result<String, CipherError> {
    let plaintext = serde_json::to_string(value)
        .map_err(|e| CipherError::Encryption(e.to_string()))?;
    encrypt(&plaintext, password)
}

/// Decrypt a blob produced by [`encrypt`], returning the raw string.
pub fn decrypt_str(blob: &str, password: &str) -> Result<String, CipherError> {
    let encoded = blob.strip_prefix(ENCRYPTED_PREFIX).ok_or_else(|| {
        CipherError::Format("missing enc:: prefix".into())
    })?;

    let payload = hex::decode(encoded)
        .map_err(|e| CipherError::Format(format!("invalid hex payload: {}", e)))?;
    if payload.len() < HEADER_LEN {
        return Err(CipherError::Format(format!(
            "payload too short: {} bytes",
            payload.len()
        )));
    }

    let salt = &payload[..SALT_LEN];
    let iv = &payload[SALT_LEN..SALT_LEN + IV_LEN];
    let tag = &payload[SALT_LEN + IV_LEN..SALT_LEN + IV_LEN + TAG_LEN];
    let iter_field = &payload[SALT_LEN + IV_LEN + TAG_LEN..HEADER_LEN];
    let ciphertext = &payload[HEADER_LEN..];

    // A well-formed payload with a garbled iteration field is corruption,
    // indistinguishable from a wrong password.
    let iterations: u32 = std::str::from_utf8(iter_field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(CipherError::Authentication)?;

    let key_bytes = derive_key(password, salt, iterations);
    let key = Key::<Aes256GcmLongIv>::from_slice(&key_bytes);
    let cipher = Aes256GcmLongIv::new(key);
    let nonce = Nonce::<U16>::from_slice(iv);

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let plain = cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|_| CipherError::Authentication)?;

    Ok(String::from_utf8_lossy(&plain).into_owned())
}

/// Decrypt a blob, recovering structure when the plaintext is JSON.
///
/// The plaintext may be a bare value rather than a structured object, in
/// which case the raw string is returned unchanged.
pub fn decrypt(blob: &str, password: &str) -> Result<Plaintext, CipherError> {
    let text = decrypt_str(blob, password)?;
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Plaintext::Json(value)),
        Err(_) => Ok(Plaintext::Text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let blob = encrypt("the quick brown fox", "hunter22").unwrap();
        assert!(blob.starts_with("enc::"));

        let plain = decrypt_str(&blob, "hunter22").unwrap();
        assert_eq!(plain, "the quick brown fox");
    }

    #[test]
    fn test_roundtrip_structured_value() {
        let value = serde_json::json!({"rawKey": "00ff00ff", "meta": [1, 2, 3]});
        let blob = encrypt_value(&value, "pw").unwrap();

        match decrypt(&blob, "pw").unwrap() {
            Plaintext::Json(v) => assert_eq!(v, value),
            Plaintext::Text(t) => panic!("expected structured plaintext, got {:?}", t),
        }
    }

    #[test]
    fn test_bare_string_stays_text() {
        // Mnemonic entropy hex is not valid JSON and must come back raw.
        let blob = encrypt("deadbeefcafe0123deadbeefcafe0123", "pw").unwrap();
        match decrypt(&blob, "pw").unwrap() {
            Plaintext::Text(t) => assert_eq!(t, "deadbeefcafe0123deadbeefcafe0123"),
            Plaintext::Json(v) => panic!("unexpected JSON parse: {:?}", v),
        }
    }

    #[test]
    fn test_wrong_password_fails_authentication() {
        let blob = encrypt("secret", "correct-password").unwrap();
        let result = decrypt_str(&blob, "wrong-password");
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_missing_prefix_is_format_error() {
        let result = decrypt_str("deadbeef", "pw");
        assert!(matches!(result, Err(CipherError::Format(_))));

        let result = decrypt_str("ENC::deadbeef", "pw");
        assert!(matches!(result, Err(CipherError::Format(_))));
    }

    #[test]
    fn test_bad_hex_is_format_error() {
        let result = decrypt_str("enc::zzzz", "pw");
        assert!(matches!(result, Err(CipherError::Format(_))));
    }

    #[test]
    fn test_short_payload_is_format_error() {
        let blob = format!("enc::{}", hex::encode([0u8; 50]));
        let result = decrypt_str(&blob, "pw");
        assert!(matches!(result, Err(CipherError::Format(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let blob = encrypt("tamper target payload", "pw").unwrap();

        // Corrupt one byte of the decoded payload past the header
        // (ciphertext region) and re-encode.
        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();
        let idx = HEADER_LEN + 2;
        payload[idx] ^= 0x01;
        let tampered = format!("enc::{}", hex::encode(payload));

        let result = decrypt_str(&tampered, "pw");
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_tampered_tag_fails_authentication() {
        let blob = encrypt("tamper target payload", "pw").unwrap();

        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();
        payload[SALT_LEN + IV_LEN] ^= 0x80; // first tag byte
        let tampered = format!("enc::{}", hex::encode(payload));

        assert!(matches!(
            decrypt_str(&tampered, "pw"),
            Err(CipherError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_iv_fails_authentication() {
        let blob = encrypt("tamper target payload", "pw").unwrap();

        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();
        payload[SALT_LEN + 3] ^= 0x01; // inside the IV
        let tampered = format!("enc::{}", hex::encode(payload));

        assert!(matches!(
            decrypt_str(&tampered, "pw"),
            Err(CipherError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_iteration_field_fails_authentication() {
        let blob = encrypt("tamper target payload", "pw").unwrap();
        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();

        // Garbling a digit into a non-digit makes the field unparseable;
        // that is corruption, reported exactly like a wrong password.
        payload[SALT_LEN + IV_LEN + TAG_LEN] = b'x';
        let tampered = format!("enc::{}", hex::encode(payload));
        assert!(matches!(
            decrypt_str(&tampered, "pw"),
            Err(CipherError::Authentication)
        ));

        // A digit flipped to a different digit changes the derived key.
        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();
        let field = SALT_LEN + IV_LEN + TAG_LEN;
        payload[field] = if payload[field] == b'9' { b'1' } else { b'9' };
        let tampered = format!("enc::{}", hex::encode(payload));
        assert!(matches!(
            decrypt_str(&tampered, "pw"),
            Err(CipherError::Authentication)
        ));
    }

    #[test]
    fn test_tampered_salt_fails_authentication() {
        let blob = encrypt("tamper target payload", "pw").unwrap();

        let mut payload = hex::decode(&blob["enc::".len()..]).unwrap();
        payload[0] ^= 0x40;
        let tampered = format!("enc::{}", hex::encode(payload));

        assert!(matches!(
            decrypt_str(&tampered, "pw"),
            Err(CipherError::Authentication)
        ));
    }

    #[test]
    fn test_blob_layout() {
        let blob = encrypt("x", "pw").unwrap();
        let payload = hex::decode(&blob["enc::".len()..]).unwrap();

        // 1-byte plaintext: header + 1 ciphertext byte.
        assert_eq!(payload.len(), HEADER_LEN + 1);

        // Iteration field is five ASCII digits in [10000, 99999].
        let field = std::str::from_utf8(&payload[96..101]).unwrap();
        let iterations: u32 = field.parse().unwrap();
        assert!((MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations));
    }

    #[test]
    fn test_different_encryptions_differ() {
        let a = encrypt("same plaintext", "pw").unwrap();
        let b = encrypt("same plaintext", "pw").unwrap();
        // Random salt/iv/iterations per call.
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let blob = encrypt("", "pw").unwrap();
        assert_eq!(decrypt_str(&blob, "pw").unwrap(), "");
    }

    #[test]
    fn test_kdf_rounds_transform() {
        // Spot-check the f64 transform against the reference computation.
        assert_eq!(kdf_rounds(10_000), (10_000f64 * 0.47 + 1337.0).floor() as u32);
        assert_eq!(kdf_rounds(99_999), (99_999f64 * 0.47 + 1337.0).floor() as u32);
        // The stored field is never the real round count.
        for it in [10_000, 31_337, 99_999] {
            assert_ne!(kdf_rounds(it), it);
        }
    }

    #[test]
    fn test_unicode_roundtrip() {
        let text = "ñemonic phrase — 日本語 🔑";
        let blob = encrypt(text, "påssword").unwrap();
        assert_eq!(decrypt_str(&blob, "påssword").unwrap(), text);
    }
}
