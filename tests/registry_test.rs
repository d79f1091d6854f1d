//! AccountRegistry integration tests
//!
//! Tests cover:
//! - Account lifecycle within a scope (create, read, update, delete)
//! - Scope isolation and cross-scope address lookups
//! - Address normalization on export/remove
//! - Serialization round trips for the by-origin and composite shapes
//! - Signing refusal

use anyhow::Result;
use secp256k1::{Secp256k1, SecretKey};
use serde_json::json;
use snap_keyring::{
    AccountRegistry, CompositeKey, KeyringConfig, KeyringError, PublicKey, ScopeMode,
    GLOBAL_ORIGIN,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Compressed public key for a deterministic secret
fn compressed_key(seed: u8) -> PublicKey {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[seed; 32]).expect("valid key");
    PublicKey::from(secp256k1::PublicKey::from_secret_key(&secp, &secret))
}

/// Raw 64-byte public key filled with one byte
fn raw_key(byte: u8) -> PublicKey {
    PublicKey::from_slice(&[byte; 64]).expect("64-byte key")
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Test 1: Account Lifecycle
// ============================================================================

#[test]
fn test_account_lifecycle_scenario() {
    init_logging();
    let mut registry = AccountRegistry::new();
    let pk = compressed_key(0x11);

    assert!(registry.create_account("o1", pk, json!({"secret": "a"})));
    assert!(!registry.create_account("o1", pk, json!({"secret": "b"})));
    assert_eq!(registry.read_account("o1", &pk), Some(&json!({"secret": "a"})));

    assert!(registry.update_account("o1", &pk, json!({"secret": "b"})));
    assert_eq!(registry.read_account("o1", &pk), Some(&json!({"secret": "b"})));

    let address = registry.delete_account("o1", &pk).expect("account present");
    assert_eq!(address, registry.derive_address(&pk));
    assert!(registry.delete_account("o1", &pk).is_none());
}

#[test]
fn test_update_is_not_upsert() {
    let mut registry = AccountRegistry::new();
    registry.create_account("o1", raw_key(1), json!(1));

    assert!(!registry.update_account("o1", &raw_key(2), json!(2)));
    assert!(registry.read_account("o1", &raw_key(2)).is_none());
    assert_eq!(registry.account_count("o1"), 1);
}

#[test]
fn test_delete_shrinks_scope_by_one() {
    let mut registry = AccountRegistry::new();
    for byte in 1..=3 {
        registry.create_account("o1", raw_key(byte), json!(byte));
    }

    registry.delete_account("o1", &raw_key(2));
    assert_eq!(registry.account_count("o1"), 2);
    assert_eq!(registry.list_accounts("o1"), vec![raw_key(1), raw_key(3)]);
}

// ============================================================================
// Test 2: Scopes
// ============================================================================

#[test]
fn test_same_key_allowed_in_different_scopes() {
    let mut registry = AccountRegistry::new();
    let pk = compressed_key(0x22);

    assert!(registry.create_account("o1", pk, json!("one")));
    assert!(registry.create_account("o2", pk, json!("two")));

    assert_eq!(registry.read_account("o1", &pk), Some(&json!("one")));
    assert_eq!(registry.read_account("o2", &pk), Some(&json!("two")));

    // Deleting from one scope leaves the other untouched
    registry.delete_account("o1", &pk);
    assert_eq!(registry.read_account("o2", &pk), Some(&json!("two")));
}

#[test]
fn test_get_accounts_follows_scope_then_insertion_order() {
    let mut registry = AccountRegistry::new();
    registry.create_account("o2", raw_key(3), json!(null));
    registry.create_account("o1", raw_key(1), json!(null));
    registry.create_account("o2", raw_key(2), json!(null));

    let expected: Vec<_> = [raw_key(3), raw_key(2), raw_key(1)]
        .iter()
        .map(|pk| registry.derive_address(pk))
        .collect();
    assert_eq!(registry.get_accounts(None), expected);

    assert_eq!(registry.get_accounts(Some("o1")), vec![expected[2].clone()]);
    assert!(registry.get_accounts(Some("missing")).is_empty());
    assert_eq!(registry.origins().collect::<Vec<_>>(), vec!["o2", "o1"]);
}

#[test]
fn test_cross_scope_export_prefers_earlier_scope() {
    let mut registry = AccountRegistry::new();
    let pk = compressed_key(0x33);
    registry.create_account("first", pk, json!("first data"));
    registry.create_account("second", pk, json!("second data"));

    let address = registry.derive_address(&pk);
    let (found, data) = registry.export_account(address.as_str()).unwrap();
    assert_eq!(*found, pk);
    assert_eq!(data, &json!("first data"));

    // Scoped export targets the requested scope only
    assert_eq!(
        registry.export_account_in("second", address.as_str()),
        Some(&json!("second data"))
    );

    // Cross-scope remove takes the first match and stops
    assert!(registry.remove_account(address.as_str()));
    assert_eq!(registry.account_count("first"), 0);
    assert_eq!(registry.account_count("second"), 1);
}

// ============================================================================
// Test 3: Address Normalization
// ============================================================================

#[test]
fn test_export_accepts_prefix_and_case_variants() {
    let mut registry = AccountRegistry::new();
    let pk = compressed_key(0x44);
    registry.create_account("o1", pk, json!({"k": "v"}));

    let address = registry.derive_address(&pk);
    let digits = address.digits().to_string();
    let variants = [
        address.as_str().to_string(),
        digits.clone(),
        digits.to_uppercase(),
        format!("0x{}", digits.to_uppercase()),
    ];

    for variant in &variants {
        let (found, _) = registry.export_account(variant).expect(variant);
        assert_eq!(*found, pk);
    }
}

#[test]
fn test_empty_registry_scenario() {
    let mut registry = AccountRegistry::new();
    assert!(registry.get_accounts(None).is_empty());
    assert!(registry.export_account("0xff").is_none());
    assert!(!registry.remove_account("0xff"));
    assert!(!registry.remove_account_in("o1", "0xff"));
}

// ============================================================================
// Test 4: Serialization
// ============================================================================

#[test]
fn test_by_origin_round_trip() -> Result<()> {
    let mut registry = AccountRegistry::new();
    registry.create_account("https://b.io", compressed_key(1), json!({"n": 1}));
    registry.create_account("https://a.io", raw_key(2), json!([true, null]));
    registry.create_account("https://b.io", raw_key(3), json!("three"));

    let wire = registry.serialize();
    assert_eq!(registry.serialize(), wire, "serialize must be idempotent");

    let mut restored = AccountRegistry::new();
    restored.deserialize(wire.clone())?;

    assert_eq!(restored.serialize().to_string(), wire.to_string());
    assert_eq!(
        restored.list_accounts("https://b.io"),
        vec![compressed_key(1), raw_key(3)]
    );
    assert_eq!(
        restored.read_account("https://a.io", &raw_key(2)),
        Some(&json!([true, null]))
    );
    Ok(())
}

#[test]
fn test_flat_round_trip_keeps_scopes() -> Result<()> {
    let fresh = AccountRegistry::with_config(KeyringConfig::flat());
    let mut restored = AccountRegistry::with_config(KeyringConfig::flat());
    restored.deserialize(fresh.serialize())?;

    assert_eq!(restored.scope_count(), fresh.scope_count());
    assert_eq!(
        restored.origins().collect::<Vec<_>>(),
        fresh.origins().collect::<Vec<_>>()
    );

    // Same after an account has come and gone
    let mut used = AccountRegistry::with_config(KeyringConfig::flat());
    used.create_account(GLOBAL_ORIGIN, raw_key(1), json!(1));
    used.delete_account(GLOBAL_ORIGIN, &raw_key(1));
    restored.deserialize(used.serialize())?;

    assert_eq!(used.scope_count(), fresh.scope_count());
    assert_eq!(restored.scope_count(), used.scope_count());
    assert_eq!(restored.serialize(), json!([]));
    Ok(())
}

#[test]
fn test_deserialize_replaces_state() -> Result<()> {
    let mut registry = AccountRegistry::new();
    registry.create_account("old", raw_key(1), json!(1));

    registry.deserialize(json!({"new": [[hex::encode([2u8; 64]), 2]]}))?;

    assert_eq!(registry.scope_count(), 1);
    assert!(registry.list_accounts("old").is_empty());
    assert_eq!(registry.read_account("new", &raw_key(2)), Some(&json!(2)));
    Ok(())
}

#[test]
fn test_deserialize_is_atomic() {
    let mut registry = AccountRegistry::new();
    registry.create_account("o1", raw_key(1), json!("keep"));
    let before = registry.serialize();

    // Second scope is broken; the valid first scope must not leak in
    let wire = json!({
        "o2": [[hex::encode([2u8; 64]), "valid"]],
        "o3": [["abc", "odd length hex"]],
    });
    let err = registry.deserialize(wire).unwrap_err();

    assert!(matches!(err, KeyringError::Decode(_)));
    assert_eq!(registry.serialize(), before);
}

#[test]
fn test_composite_round_trip() -> Result<()> {
    let mut registry = AccountRegistry::with_config(KeyringConfig::composite());
    assert_eq!(registry.scope_mode(), ScopeMode::ByComposite);

    let scope = CompositeKey::new("npm:@acme/snap", "https://dapp.io")?;
    registry.create_account(scope.as_str(), compressed_key(5), json!({"path": "m/44'"}));

    let wire = registry.serialize();
    let expected_key = compressed_key(5).to_hex();
    assert_eq!(
        wire,
        json!({"npm:@acme/snap https://dapp.io": {expected_key: {"path": "m/44'"}}})
    );

    let mut restored = AccountRegistry::with_config(KeyringConfig::composite());
    restored.deserialize(wire.clone())?;
    assert_eq!(restored.serialize(), wire);
    Ok(())
}

// ============================================================================
// Test 5: Signing
// ============================================================================

#[test]
fn test_signing_always_fails() {
    let mut registry = AccountRegistry::new();
    let pk = compressed_key(0x55);
    registry.create_account("o1", pk, json!({"secret": "x"}));
    let address = registry.derive_address(&pk);

    let tx = registry.sign_transaction(address.as_str(), &json!({"to": "0x00"}));
    let msg = registry.sign_message(address.as_str(), &json!("hello"));

    assert!(matches!(tx, Err(KeyringError::Unsupported(_))));
    assert!(matches!(msg, Err(KeyringError::Unsupported(_))));
}
