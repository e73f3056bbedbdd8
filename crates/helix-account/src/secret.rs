//! The wallet master secret.
//!
//! A wallet is backed either by a BIP39 mnemonic (multi-address, HD
//! derivation) or by a single raw secp256k1 private key. Both forms
//! serialize to the plaintext the cipher engine wraps: bare entropy hex
//! for mnemonics (the original wallet file format), a tagged JSON object
//! for raw keys.

use crate::error::AccountError;
use bip39::{Language, Mnemonic, MnemonicType};
use k256::ecdsa::SigningKey;
use rand::RngCore;
use zeroize::Zeroizing;

/// Which kind of master secret a wallet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletMode {
    /// BIP39 recovery phrase; addresses derived per index.
    Mnemonic,
    /// Single raw private key; one address only.
    RawKey,
}

/// Wallet master secret.
pub enum Secret {
    Mnemonic(Mnemonic),
    RawKey(Zeroizing<[u8; 32]>),
}

impl Secret {
    /// Generate a fresh random secret of the given kind.
    pub fn generate(mode: WalletMode) -> Self {
        match mode {
            WalletMode::Mnemonic => {
                Self::Mnemonic(Mnemonic::new(MnemonicType::Words12, Language::English))
            }
            WalletMode::RawKey => {
                let mut rng = rand::thread_rng();
                let mut bytes = Zeroizing::new([0u8; 32]);
                // Rejection-sample until the scalar is a valid field element.
                loop {
                    rng.fill_bytes(bytes.as_mut());
                    if SigningKey::from_bytes(&(*bytes).into()).is_ok() {
                        break;
                    }
                }
                Self::RawKey(bytes)
            }
        }
    }

    /// Build a mnemonic secret from a user-supplied phrase.
    pub fn from_phrase(phrase: &str) -> Result<Self, AccountError> {
        let mnemonic = Mnemonic::from_phrase(phrase.trim(), Language::English)
            .map_err(|e| AccountError::InvalidMnemonic(e.to_string()))?;
        Ok(Self::Mnemonic(mnemonic))
    }

    /// Rebuild a mnemonic secret from its entropy (hex).
    pub fn from_entropy_hex(entropy_hex: &str) -> Result<Self, AccountError> {
        let entropy = hex::decode(entropy_hex.trim())
            .map_err(|e| AccountError::InvalidEntropy(e.to_string()))?;
        let mnemonic = Mnemonic::from_entropy(&entropy, Language::English)
            .map_err(|e| AccountError::InvalidEntropy(e.to_string()))?;
        Ok(Self::Mnemonic(mnemonic))
    }

    /// Rebuild a raw-key secret from its hex encoding.
    pub fn from_raw_key_hex(key_hex: &str) -> Result<Self, AccountError> {
        let raw = key_hex.trim().trim_start_matches("0x");
        let bytes = hex::decode(raw).map_err(|e| AccountError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AccountError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&bytes);
        SigningKey::from_bytes(&(*key).into())
            .map_err(|e| AccountError::InvalidKey(e.to_string()))?;
        Ok(Self::RawKey(key))
    }

    /// Whether a phrase is a valid BIP39 mnemonic.
    pub fn validate_phrase(phrase: &str) -> bool {
        Mnemonic::from_phrase(phrase.trim(), Language::English).is_ok()
    }

    pub fn mode(&self) -> WalletMode {
        match self {
            Self::Mnemonic(_) => WalletMode::Mnemonic,
            Self::RawKey(_) => WalletMode::RawKey,
        }
    }

    /// The recovery phrase, for mnemonic wallets.
    pub fn phrase(&self) -> Option<&str> {
        match self {
            Self::Mnemonic(m) => Some(m.phrase()),
            Self::RawKey(_) => None,
        }
    }

    /// Serialize to the plaintext the cipher engine protects.
    pub fn to_plaintext(&self) -> Zeroizing<String> {
        match self {
            Self::Mnemonic(m) => Zeroizing::new(hex::encode(m.entropy())),
            Self::RawKey(key) => Zeroizing::new(
                serde_json::json!({ "rawKey": hex::encode(key.as_ref()) }).to_string(),
            ),
        }
    }

    /// Reverse of [`to_plaintext`](Self::to_plaintext).
    ///
    /// Accepts the tagged raw-key object, falling back to bare entropy
    /// hex (the original wallet file stores mnemonics that way).
    pub fn from_plaintext(plaintext: &str) -> Result<Self, AccountError> {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(plaintext) {
            if let Some(key_hex) = value.get("rawKey").and_then(|v| v.as_str()) {
                return Self::from_raw_key_hex(key_hex);
            }
        }
        Self::from_entropy_hex(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_mnemonic_is_valid() {
        let secret = Secret::generate(WalletMode::Mnemonic);
        let phrase = secret.phrase().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert!(Secret::validate_phrase(phrase));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = Secret::generate(WalletMode::Mnemonic);
        let b = Secret::generate(WalletMode::Mnemonic);
        assert_ne!(a.phrase(), b.phrase());
    }

    #[test]
    fn test_mnemonic_plaintext_roundtrip() {
        let secret = Secret::generate(WalletMode::Mnemonic);
        let restored = Secret::from_plaintext(&secret.to_plaintext()).unwrap();
        assert_eq!(secret.phrase(), restored.phrase());
    }

    #[test]
    fn test_raw_key_plaintext_roundtrip() {
        let secret = Secret::generate(WalletMode::RawKey);
        let plaintext = secret.to_plaintext();
        assert!(plaintext.contains("rawKey"));

        let restored = Secret::from_plaintext(&plaintext).unwrap();
        assert_eq!(restored.mode(), WalletMode::RawKey);
        assert_eq!(*restored.to_plaintext(), *plaintext);
    }

    #[test]
    fn test_all_digit_entropy_still_parses_as_mnemonic() {
        // 16 bytes of entropy whose hex is also valid JSON (a number);
        // the fallback path must still recover the mnemonic.
        let entropy_hex = "11111111111111111111111111111111";
        let secret = Secret::from_plaintext(entropy_hex).unwrap();
        assert_eq!(secret.mode(), WalletMode::Mnemonic);
        assert_eq!(*secret.to_plaintext(), entropy_hex);
    }

    #[test]
    fn test_invalid_phrase_rejected() {
        assert!(!Secret::validate_phrase("not a real mnemonic phrase at all"));
        assert!(Secret::from_phrase("zebra zebra zebra").is_err());
    }

    #[test]
    fn test_known_phrase_accepted() {
        let phrase = "test test test test test test test test test test test junk";
        assert!(Secret::validate_phrase(phrase));
        let secret = Secret::from_phrase(phrase).unwrap();
        assert_eq!(secret.phrase(), Some(phrase));
    }

    #[test]
    fn test_raw_key_rejects_bad_lengths() {
        assert!(Secret::from_raw_key_hex("abcd").is_err());
        assert!(Secret::from_raw_key_hex("zz").is_err());
        // The zero scalar is not a valid key.
        assert!(Secret::from_raw_key_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_raw_key_accepts_0x_prefix() {
        let hex_key = format!("0x{}", "46".repeat(32));
        let secret = Secret::from_raw_key_hex(&hex_key).unwrap();
        assert_eq!(secret.mode(), WalletMode::RawKey);
    }
}
