//! Crypto primitives for the Helix wallet.
//!
//! Provides the password-based authenticated encryption scheme used to
//! protect the wallet secret at rest, keccak-based message hashing, and
//! the X25519 note-encryption keypair for private transfers.

pub mod cipher;
pub mod error;
pub mod hash;
pub mod notebox;

pub use cipher::{decrypt, decrypt_str, encrypt, encrypt_value, Plaintext};
pub use error::CipherError;
pub use hash::{keccak256, personal_hash, personal_hash_bytes};
pub use notebox::NoteKeypair;
