//! Durable key-value storage for the Helix wallet.
//!
//! A [`SecretStore`] maps string keys to arbitrary JSON values in a single
//! file. It is schema-agnostic: the keyring owns some keys, collaborators
//! (token book, transfer notes) own others, and unknown keys are always
//! preserved. Writes are whole-file replacements, never partial.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::SecretStore;
