//! Scoped account registry
//!
//! Holds accounts grouped by scope key (an origin string, a composite
//! `snapId origin` key, or the single global scope of a flat deployment).
//!
//! ## Invariants
//!
//! - A public key appears at most once per scope
//! - The same public key may appear in several scopes
//! - Scope creation order and insertion order within a scope are preserved;
//!   they decide serialization order and which account wins a cross-scope
//!   address lookup
//! - Scopes are never dropped once created, even when emptied
//!
//! Addresses are never cached; every address lookup re-derives from the
//! stored public keys.

use crate::account::{Account, AccountList};
use crate::address::{Address, AddressDeriver, KeccakDeriver};
use crate::codec::{self, Scopes};
use crate::config::KeyringConfig;
use crate::error::KeyringError;
use crate::keyring::{refuse_signing, Keyring};
use crate::public_key::PublicKey;
use crate::scope::{CompositeKey, ScopeMode, GLOBAL_ORIGIN};
use async_trait::async_trait;
use serde_json::Value;

/// Account store scoped by origin
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use snap_keyring::{AccountRegistry, PublicKey};
///
/// let mut registry = AccountRegistry::new();
/// let key = PublicKey::from_slice(&[0xde; 64]).unwrap();
///
/// assert!(registry.create_account("https://dapp.io", key, json!({"secret": "a"})));
/// assert!(!registry.create_account("https://dapp.io", key, json!({"secret": "b"})));
/// assert_eq!(
///     registry.read_account("https://dapp.io", &key),
///     Some(&json!({"secret": "a"}))
/// );
/// ```
#[derive(Clone, Debug)]
pub struct AccountRegistry<D = KeccakDeriver> {
    /// Scope key -> accounts, in scope creation order
    scopes: Scopes,

    config: KeyringConfig,

    deriver: D,
}

impl AccountRegistry<KeccakDeriver> {
    /// Empty registry scoped by origin
    pub fn new() -> Self {
        Self::with_config(KeyringConfig::default())
    }

    /// Empty registry for the given deployment
    pub fn with_config(config: KeyringConfig) -> Self {
        Self::with_deriver(config, KeccakDeriver)
    }
}

impl Default for AccountRegistry<KeccakDeriver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: AddressDeriver> AccountRegistry<D> {
    /// Empty registry using a custom address deriver
    ///
    /// Flat deployments start with their single global scope in place, the
    /// same state `deserialize` produces.
    pub fn with_deriver(config: KeyringConfig, deriver: D) -> Self {
        let mut scopes = Scopes::new();
        if config.scope_mode == ScopeMode::Flat {
            scopes.insert(GLOBAL_ORIGIN.to_string(), AccountList::new());
        }
        Self {
            scopes,
            config,
            deriver,
        }
    }

    pub fn config(&self) -> &KeyringConfig {
        &self.config
    }

    pub fn scope_mode(&self) -> ScopeMode {
        self.config.scope_mode
    }

    /// Derive the address of a public key with this registry's deriver
    pub fn derive_address(&self, public_key: &PublicKey) -> Address {
        self.deriver.derive_address(public_key)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Addresses of every account, or of one scope
    ///
    /// Unknown scopes yield an empty list.
    pub fn get_accounts(&self, origin: Option<&str>) -> Vec<Address> {
        match origin {
            Some(origin) => self
                .scopes
                .get(origin)
                .map(|accounts| accounts.addresses(&self.deriver).collect())
                .unwrap_or_default(),
            None => self
                .scopes
                .values()
                .flat_map(|accounts| accounts.addresses(&self.deriver))
                .collect(),
        }
    }

    /// Public keys of one scope in insertion order
    pub fn list_accounts(&self, origin: &str) -> Vec<PublicKey> {
        self.scopes
            .get(origin)
            .map(|accounts| accounts.iter().map(|a| *a.public_key()).collect())
            .unwrap_or_default()
    }

    /// Private data stored for `public_key` in `origin`
    pub fn read_account(&self, origin: &str, public_key: &PublicKey) -> Option<&Value> {
        self.scopes.get(origin)?.get(public_key)
    }

    /// Number of accounts in one scope (zero for unknown scopes)
    pub fn account_count(&self, origin: &str) -> usize {
        self.scopes.get(origin).map_or(0, AccountList::len)
    }

    /// Number of scopes, including emptied ones
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Scope keys in creation order
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// True when no scope holds an account
    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(AccountList::is_empty)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add an account unless `origin` already holds the same public key
    ///
    /// The scope is created on first insertion. Returns `false` for a
    /// duplicate key, leaving the stored data untouched, and for a scope key
    /// that the deployment's scope mode cannot serialize.
    pub fn create_account(
        &mut self,
        origin: &str,
        public_key: PublicKey,
        private_data: Value,
    ) -> bool {
        if let Err(e) = self.check_scope_key(origin) {
            log::warn!("Rejected account for scope {:?}: {}", origin, e);
            return false;
        }

        let inserted = self
            .scopes
            .entry(origin.to_string())
            .or_insert_with(AccountList::new)
            .insert(public_key, private_data);

        if inserted {
            log::debug!(
                "Created account {} in scope {:?}",
                self.deriver.derive_address(&public_key),
                origin
            );
        } else {
            log::debug!("Account already exists in scope {:?}", origin);
        }
        inserted
    }

    /// Replace the private data of an existing account
    ///
    /// Never inserts: returns `false` when the scope or key is missing.
    pub fn update_account(
        &mut self,
        origin: &str,
        public_key: &PublicKey,
        private_data: Value,
    ) -> bool {
        let updated = self
            .scopes
            .get_mut(origin)
            .is_some_and(|accounts| accounts.replace(public_key, private_data));

        if updated {
            log::debug!("Updated account in scope {:?}", origin);
        }
        updated
    }

    /// Remove the account for `public_key` and return its address
    pub fn delete_account(&mut self, origin: &str, public_key: &PublicKey) -> Option<Address> {
        let removed = self.scopes.get_mut(origin)?.remove(public_key)?;
        let address = self.deriver.derive_address(removed.public_key());
        log::debug!("Deleted account {} from scope {:?}", address, origin);
        Some(address)
    }

    // ========================================================================
    // Lookups by address
    // ========================================================================

    /// Find an account by address across all scopes
    ///
    /// The address may carry a `0x` prefix and use any case. Should several
    /// accounts derive the same address, the first in scope order, then
    /// insertion order, is returned.
    pub fn export_account(&self, address: &str) -> Option<(&PublicKey, &Value)> {
        self.scopes
            .values()
            .find_map(|accounts| accounts.find_by_address(&self.deriver, address))
            .map(|account| (account.public_key(), account.private_data()))
    }

    /// Find an account by address within one scope
    pub fn export_account_in(&self, origin: &str, address: &str) -> Option<&Value> {
        self.scopes
            .get(origin)?
            .find_by_address(&self.deriver, address)
            .map(Account::private_data)
    }

    /// Remove the first account matching `address` across all scopes
    ///
    /// At most one account is removed per call.
    pub fn remove_account(&mut self, address: &str) -> bool {
        let deriver = &self.deriver;
        let removed = self.scopes.iter_mut().find_map(|(origin, accounts)| {
            accounts
                .remove_by_address(deriver, address)
                .map(|_| origin.as_str())
        });

        match removed {
            Some(origin) => {
                log::debug!("Removed account {} from scope {:?}", address, origin);
                true
            }
            None => false,
        }
    }

    /// Remove the first account matching `address` within one scope
    pub fn remove_account_in(&mut self, origin: &str, address: &str) -> bool {
        let removed = self
            .scopes
            .get_mut(origin)
            .and_then(|accounts| accounts.remove_by_address(&self.deriver, address))
            .is_some();

        if removed {
            log::debug!("Removed account {} from scope {:?}", address, origin);
        }
        removed
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Encode the whole registry in the deployment's wire shape
    pub fn serialize(&self) -> Value {
        codec::encode_scopes(self.config.scope_mode, &self.scopes)
    }

    /// Replace the whole registry from its wire shape
    ///
    /// Existing state is discarded, not merged. On error the registry is left
    /// exactly as it was.
    pub fn deserialize(&mut self, wire: Value) -> Result<(), KeyringError> {
        let scopes = codec::decode_scopes(self.config.scope_mode, wire)
            .inspect_err(|e| log::warn!("Rejected keyring state: {}", e))?;

        log::info!(
            "Restored {} accounts in {} scopes",
            scopes.values().map(AccountList::len).sum::<usize>(),
            scopes.len()
        );
        self.scopes = scopes;
        Ok(())
    }

    // ========================================================================
    // Signing
    // ========================================================================

    /// Always fails: signing is delegated to an external signer
    pub fn sign_transaction(
        &self,
        _address: &str,
        _transaction: &Value,
    ) -> Result<Value, KeyringError> {
        Err(refuse_signing(self.config.signer, "signTransaction"))
    }

    /// Always fails: signing is delegated to an external signer
    pub fn sign_message(&self, _address: &str, _message: &Value) -> Result<Value, KeyringError> {
        Err(refuse_signing(self.config.signer, "signMessage"))
    }

    fn check_scope_key(&self, origin: &str) -> Result<(), KeyringError> {
        match self.config.scope_mode {
            ScopeMode::Flat if origin != GLOBAL_ORIGIN => Err(KeyringError::InvalidScopeKey(
                "flat keyrings only hold the global scope".to_string(),
            )),
            ScopeMode::ByComposite => CompositeKey::parse(origin).map(|_| ()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<D> Keyring for AccountRegistry<D>
where
    D: AddressDeriver + Send + Sync,
{
    async fn serialize(&self) -> Result<Value, KeyringError> {
        Ok(AccountRegistry::serialize(self))
    }

    async fn deserialize(&mut self, wire: Value) -> Result<(), KeyringError> {
        AccountRegistry::deserialize(self, wire)
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, KeyringError> {
        Ok(AccountRegistry::get_accounts(self, None))
    }

    async fn export_account(
        &self,
        address: &str,
    ) -> Result<Option<(PublicKey, Value)>, KeyringError> {
        Ok(AccountRegistry::export_account(self, address)
            .map(|(public_key, data)| (*public_key, data.clone())))
    }

    async fn remove_account(&mut self, address: &str) -> Result<bool, KeyringError> {
        Ok(AccountRegistry::remove_account(self, address))
    }

    async fn sign_transaction(
        &self,
        address: &str,
        transaction: &Value,
    ) -> Result<Value, KeyringError> {
        AccountRegistry::sign_transaction(self, address, transaction)
    }

    async fn sign_message(&self, address: &str, message: &Value) -> Result<Value, KeyringError> {
        AccountRegistry::sign_message(self, address, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ADDRESS_LEN;
    use crate::config::SignerStatus;
    use serde_json::json;

    fn key(byte: u8) -> PublicKey {
        PublicKey::from_slice(&[byte; 64]).unwrap()
    }

    /// Maps every key to the same address
    struct CollidingDeriver;

    impl AddressDeriver for CollidingDeriver {
        fn derive_address(&self, _public_key: &PublicKey) -> Address {
            Address::from_bytes([0xaa; ADDRESS_LEN])
        }
    }

    #[test]
    fn test_scopes_created_implicitly_and_kept_when_empty() {
        let mut registry = AccountRegistry::new();
        assert!(registry.create_account("o1", key(1), json!(1)));
        assert_eq!(registry.scope_count(), 1);

        assert!(registry.delete_account("o1", &key(1)).is_some());
        assert_eq!(registry.scope_count(), 1);
        assert_eq!(registry.account_count("o1"), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.serialize(), json!({"o1": []}));
    }

    #[test]
    fn test_unknown_scope_reads_are_empty() {
        let registry = AccountRegistry::new();
        assert!(registry.get_accounts(Some("nope")).is_empty());
        assert!(registry.list_accounts("nope").is_empty());
        assert!(registry.read_account("nope", &key(1)).is_none());
        assert!(registry.export_account_in("nope", "0xff").is_none());
    }

    #[test]
    fn test_update_on_missing_scope_does_not_create_it() {
        let mut registry = AccountRegistry::new();
        assert!(!registry.update_account("o1", &key(1), json!(1)));
        assert_eq!(registry.scope_count(), 0);
    }

    #[test]
    fn test_cross_scope_export_first_match_wins() {
        let mut registry =
            AccountRegistry::with_deriver(KeyringConfig::default(), CollidingDeriver);
        registry.create_account("o1", key(1), json!("first"));
        registry.create_account("o2", key(2), json!("second"));

        // prefix of an address, not a match
        assert!(registry.export_account("0xAA").is_none());

        let address = "aa".repeat(ADDRESS_LEN);
        let (public_key, data) = registry.export_account(&address).unwrap();
        assert_eq!(*public_key, key(1));
        assert_eq!(data, &json!("first"));
    }

    #[test]
    fn test_remove_takes_only_first_colliding_account() {
        let mut registry =
            AccountRegistry::with_deriver(KeyringConfig::default(), CollidingDeriver);
        registry.create_account("o1", key(1), json!(1));
        registry.create_account("o1", key(2), json!(2));
        registry.create_account("o2", key(3), json!(3));

        let address = format!("0x{}", "AA".repeat(ADDRESS_LEN));
        assert!(registry.remove_account(&address));
        assert_eq!(registry.list_accounts("o1"), vec![key(2)]);
        assert_eq!(registry.account_count("o2"), 1);

        assert!(registry.remove_account_in("o2", &address));
        assert_eq!(registry.account_count("o2"), 0);
        assert_eq!(registry.account_count("o1"), 1);
    }

    #[test]
    fn test_composite_mode_rejects_plain_origins() {
        let mut registry = AccountRegistry::with_config(KeyringConfig::composite());
        assert!(!registry.create_account("https://dapp.io", key(1), json!(1)));
        assert_eq!(registry.scope_count(), 0);

        let scope = CompositeKey::new("npm:snap", "https://dapp.io").unwrap();
        assert!(registry.create_account(scope.as_str(), key(1), json!(1)));
        let hex_key = key(1).to_hex();
        assert_eq!(
            registry.serialize(),
            json!({"npm:snap https://dapp.io": {hex_key: 1}})
        );
    }

    #[test]
    fn test_flat_mode_only_accepts_global_scope() {
        let mut registry = AccountRegistry::with_config(KeyringConfig::flat());
        assert_eq!(registry.origins().collect::<Vec<_>>(), vec![GLOBAL_ORIGIN]);
        assert!(!registry.create_account("o1", key(1), json!(1)));
        assert_eq!(registry.scope_count(), 1);
        assert!(registry.create_account(GLOBAL_ORIGIN, key(1), json!(1)));
        assert_eq!(registry.serialize(), json!([[hex::encode([1u8; 64]), 1]]));
    }

    #[test]
    fn test_failed_deserialize_keeps_state() {
        let mut registry = AccountRegistry::new();
        registry.create_account("o1", key(1), json!({"keep": true}));
        let before = registry.serialize();

        let err = registry
            .deserialize(json!({"o2": [["not hex", 1]]}))
            .unwrap_err();
        assert!(matches!(err, KeyringError::Decode(_)));
        assert_eq!(registry.serialize(), before);
    }

    #[test]
    fn test_signing_variant_follows_config() {
        let registry = AccountRegistry::new();
        assert!(matches!(
            registry.sign_message("0xff", &json!("hi")),
            Err(KeyringError::Unsupported(_))
        ));

        let pending = AccountRegistry::with_config(KeyringConfig::default().with_pending_signer());
        assert!(matches!(
            pending.sign_transaction("0xff", &json!({})),
            Err(KeyringError::NotImplemented(_))
        ));
        assert_eq!(pending.config().signer, SignerStatus::Pending);
    }
}
