//! Wire codec
//!
//! Converts registry state to and from JSON. Public keys travel as lowercase
//! hex without prefix, private data is passed through untouched, and order
//! is preserved everywhere (object keys included, via serde_json's
//! `preserve_order`).
//!
//! ## Shapes
//!
//! ```text
//! Flat         [["<hexKey>", <data>], ...]
//! ByOrigin     {"<origin>": [["<hexKey>", <data>], ...], ...}
//! ByComposite  {"<snapId> <origin>": {"<hexKey>": <data>, ...}, ...}
//! ```
//!
//! Decoding builds a complete new state or fails; callers swap it in only
//! on success. Keys must be in the canonical encoding (lowercase, no `0x`
//! prefix) so that a decode followed by an encode reproduces the input.

use crate::account::AccountList;
use crate::error::KeyringError;
use crate::public_key::PublicKey;
use crate::scope::{CompositeKey, ScopeMode, GLOBAL_ORIGIN};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One `[hexKey, data]` pair
pub type WireEntry = (String, Value);

/// Flat wire shape
pub type FlatWire = Vec<WireEntry>;

/// By-origin wire shape
pub type OriginWire = IndexMap<String, FlatWire>;

/// By-composite wire shape
pub type CompositeWire = IndexMap<String, IndexMap<String, Value>>;

/// Registry state keyed by scope, in scope creation order
pub(crate) type Scopes = IndexMap<String, AccountList>;

// ============================================================================
// Encoding
// ============================================================================

/// Encode one account list as `[[hexKey, data], ...]`
pub(crate) fn encode_flat(accounts: &AccountList) -> Value {
    Value::Array(
        accounts
            .iter()
            .map(|account| {
                Value::Array(vec![
                    Value::String(account.public_key().to_hex()),
                    account.private_data().clone(),
                ])
            })
            .collect(),
    )
}

fn encode_keyed(accounts: &AccountList) -> Value {
    Value::Object(
        accounts
            .iter()
            .map(|account| (account.public_key().to_hex(), account.private_data().clone()))
            .collect::<Map<String, Value>>(),
    )
}

/// Encode scoped state in the shape selected by `mode`
///
/// `Flat` emits only the global scope.
pub(crate) fn encode_scopes(mode: ScopeMode, scopes: &Scopes) -> Value {
    match mode {
        ScopeMode::Flat => scopes
            .get(GLOBAL_ORIGIN)
            .map(encode_flat)
            .unwrap_or_else(|| Value::Array(Vec::new())),
        ScopeMode::ByOrigin => Value::Object(
            scopes
                .iter()
                .map(|(origin, accounts)| (origin.clone(), encode_flat(accounts)))
                .collect(),
        ),
        ScopeMode::ByComposite => Value::Object(
            scopes
                .iter()
                .map(|(key, accounts)| (key.clone(), encode_keyed(accounts)))
                .collect(),
        ),
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode `[[hexKey, data], ...]` into one account list
pub(crate) fn decode_flat(wire: Value) -> Result<AccountList, KeyringError> {
    let entries: FlatWire = serde_json::from_value(wire)
        .map_err(|e| KeyringError::decode(format!("expected [publicKey, data] pairs: {}", e)))?;
    collect_accounts(GLOBAL_ORIGIN, entries)
}

/// Decode scoped state in the shape selected by `mode`
pub(crate) fn decode_scopes(mode: ScopeMode, wire: Value) -> Result<Scopes, KeyringError> {
    match mode {
        ScopeMode::Flat => {
            let mut scopes = Scopes::new();
            scopes.insert(GLOBAL_ORIGIN.to_string(), decode_flat(wire)?);
            Ok(scopes)
        }
        ScopeMode::ByOrigin => {
            let wire: OriginWire = serde_json::from_value(wire).map_err(|e| {
                KeyringError::decode(format!("expected origin -> [publicKey, data] pairs: {}", e))
            })?;
            wire.into_iter()
                .map(|(origin, entries)| {
                    let accounts = collect_accounts(&origin, entries)?;
                    Ok::<_, KeyringError>((origin, accounts))
                })
                .collect()
        }
        ScopeMode::ByComposite => {
            let wire: CompositeWire = serde_json::from_value(wire).map_err(|e| {
                KeyringError::decode(format!("expected scope -> publicKey -> data: {}", e))
            })?;
            wire.into_iter()
                .map(|(key, entries)| {
                    CompositeKey::parse(&key)
                        .map_err(|e| KeyringError::decode(e.to_string()))?;
                    let accounts = collect_accounts(&key, entries)?;
                    Ok::<_, KeyringError>((key, accounts))
                })
                .collect()
        }
    }
}

fn collect_accounts<I>(scope: &str, entries: I) -> Result<AccountList, KeyringError>
where
    I: IntoIterator<Item = WireEntry>,
{
    let mut accounts = AccountList::new();
    for (hex_key, private_data) in entries {
        let public_key = PublicKey::from_hex(&hex_key)
            .map_err(|e| KeyringError::decode(format!("scope {:?}: {}", scope, e)))?;
        if public_key.to_hex() != hex_key {
            return Err(KeyringError::decode(format!(
                "scope {:?}: public key {} is not lowercase unprefixed hex",
                scope, hex_key
            )));
        }
        if !accounts.insert(public_key, private_data) {
            return Err(KeyringError::decode(format!(
                "scope {:?}: duplicate public key {}",
                scope, hex_key
            )));
        }
    }
    Ok(accounts)
}
