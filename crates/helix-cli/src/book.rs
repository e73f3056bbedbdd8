//! Collaborator-owned bookkeeping: tracked tokens and transfer notes.
//!
//! Both live under their own top-level store keys (`tokens`,
//! `transfer_notes`) next to the keyring's record; the store preserves
//! them across wallet operations and even across `remove`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use helix_store::{SecretStore, StoreError};

const TOKENS: &str = "tokens";
const TRANSFER_NOTES: &str = "transfer_notes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMeta {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferNote {
    pub chain: String,
    pub token: String,
    pub amount: String,
    pub secret_number: String,
}

/// Tracked tokens for a chain, sorted by contract address.
pub fn list_tokens(store: &SecretStore, chain: &str) -> Vec<(String, TokenMeta)> {
    let mut tokens: Vec<(String, TokenMeta)> = store
        .get(TOKENS)
        .and_then(|v| v.get(chain))
        .and_then(|v| v.as_object())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(address, meta)| {
                    serde_json::from_value(meta.clone())
                        .ok()
                        .map(|meta| (address.clone(), meta))
                })
                .collect()
        })
        .unwrap_or_default();
    tokens.sort_by(|a, b| a.0.cmp(&b.0));
    tokens
}

pub fn add_token(
    store: &mut SecretStore,
    chain: &str,
    address: &str,
    meta: TokenMeta,
) -> Result<(), StoreError> {
    let mut tokens = store.get(TOKENS).cloned().unwrap_or_else(|| json!({}));
    if let Some(chains) = tokens.as_object_mut() {
        let entries = chains
            .entry(chain.to_string())
            .or_insert_with(|| json!({}));
        if let Some(entries) = entries.as_object_mut() {
            entries.insert(address.to_string(), json!(meta));
        }
    }
    store.set(TOKENS, tokens);
    store.save()
}

pub fn remove_token(
    store: &mut SecretStore,
    chain: &str,
    address: &str,
) -> Result<(), StoreError> {
    let mut tokens = store.get(TOKENS).cloned().unwrap_or_else(|| json!({}));
    if let Some(entries) = tokens.get_mut(chain).and_then(Value::as_object_mut) {
        entries.remove(address);
    }
    store.set(TOKENS, tokens);
    store.save()
}

/// All imported transfer notes, oldest first.
pub fn list_notes(store: &SecretStore) -> Vec<TransferNote> {
    store
        .get(TRANSFER_NOTES)
        .and_then(|v| v.as_array())
        .map(|notes| {
            notes
                .iter()
                .filter_map(|n| serde_json::from_value(n.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

pub fn import_note(store: &mut SecretStore, note: TransferNote) -> Result<(), StoreError> {
    let mut notes = store
        .get(TRANSFER_NOTES)
        .cloned()
        .unwrap_or_else(|| json!([]));
    if let Some(list) = notes.as_array_mut() {
        list.push(json!(note));
    }
    store.set(TRANSFER_NOTES, notes);
    store.save()
}
