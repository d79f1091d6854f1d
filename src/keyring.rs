//! Keyring interface and the unscoped snap keyring
//!
//! ## Async Interface
//!
//! Sibling keyrings in a host (hardware-backed ones in particular) block on
//! I/O, so hosts drive every keyring through the async [`Keyring`] trait.
//! Implementations in this crate complete without ever suspending: each
//! method does its work synchronously and returns a ready future.
//!
//! ## Signing
//!
//! Signing is done by an external signer that reads the private data out of
//! band. Every signing call here fails, with `NotImplemented` while the
//! integration is pending or `Unsupported` once it is final.

use crate::address::{Address, AddressDeriver, KeccakDeriver};
use crate::config::{KeyringConfig, SignerStatus};
use crate::error::KeyringError;
use crate::public_key::PublicKey;
use crate::registry::AccountRegistry;
use crate::scope::{ScopeMode, GLOBAL_ORIGIN};
use async_trait::async_trait;
use serde_json::Value;

/// Type tag shared by every snap keyring instance
pub const KEYRING_TYPE: &str = "Snap Keyring";

/// Interface shared with the host's other keyrings
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Static type tag of this keyring kind
    fn type_name(&self) -> &'static str {
        KEYRING_TYPE
    }

    /// Encode the keyring for persistence
    async fn serialize(&self) -> Result<Value, KeyringError>;

    /// Replace the keyring contents from persisted state
    async fn deserialize(&mut self, wire: Value) -> Result<(), KeyringError>;

    /// Addresses of all held accounts
    async fn get_accounts(&self) -> Result<Vec<Address>, KeyringError>;

    /// Public key and private data of the first account at `address`
    async fn export_account(
        &self,
        address: &str,
    ) -> Result<Option<(PublicKey, Value)>, KeyringError>;

    /// Remove the first account at `address`
    async fn remove_account(&mut self, address: &str) -> Result<bool, KeyringError>;

    async fn sign_transaction(
        &self,
        address: &str,
        transaction: &Value,
    ) -> Result<Value, KeyringError>;

    async fn sign_message(&self, address: &str, message: &Value) -> Result<Value, KeyringError>;
}

/// Build the keyring matching a deployment configuration
///
/// Flat deployments get a [`SnapKeyring`], scoped ones an [`AccountRegistry`].
pub fn keyring_from_config(config: KeyringConfig) -> Box<dyn Keyring> {
    match config.scope_mode {
        ScopeMode::Flat => Box::new(SnapKeyring::with_config(config)),
        ScopeMode::ByOrigin | ScopeMode::ByComposite => {
            Box::new(AccountRegistry::with_config(config))
        }
    }
}

pub(crate) fn refuse_signing(status: SignerStatus, operation: &str) -> KeyringError {
    log::warn!("{} requested from snap keyring ({:?})", operation, status);
    match status {
        SignerStatus::Pending => KeyringError::NotImplemented(operation.to_string()),
        SignerStatus::Unsupported => KeyringError::Unsupported(operation.to_string()),
    }
}

/// Unscoped keyring storing JSON private data per public key
///
/// Accounts live in one implicit scope and serialize as a flat list of
/// `[hexPublicKey, data]` pairs. Callers refer to accounts by address.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use snap_keyring::{PublicKey, SnapKeyring};
///
/// let mut keyring = SnapKeyring::new();
/// let key = PublicKey::from_slice(&[0xde; 64]).unwrap();
/// keyring.add_account(key, json!({"secret": "a"}));
///
/// let address = keyring.get_accounts()[0].clone();
/// let (_, data) = keyring.export_account(address.as_str()).unwrap();
/// assert_eq!(data, &json!({"secret": "a"}));
/// ```
#[derive(Clone, Debug)]
pub struct SnapKeyring<D = KeccakDeriver> {
    registry: AccountRegistry<D>,
}

impl SnapKeyring<KeccakDeriver> {
    pub fn new() -> Self {
        Self::with_config(KeyringConfig::flat())
    }

    /// Keyring honoring the signer setting of `config`
    ///
    /// The scope mode is always flat, whatever `config` says.
    pub fn with_config(config: KeyringConfig) -> Self {
        Self::with_deriver(config, KeccakDeriver)
    }
}

impl Default for SnapKeyring<KeccakDeriver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: AddressDeriver> SnapKeyring<D> {
    pub fn with_deriver(config: KeyringConfig, deriver: D) -> Self {
        if config.scope_mode != ScopeMode::Flat {
            log::debug!("Snap keyring ignores scope mode {}", config.scope_mode);
        }
        let config = KeyringConfig {
            scope_mode: ScopeMode::Flat,
            ..config
        };
        Self {
            registry: AccountRegistry::with_deriver(config, deriver),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.account_count(GLOBAL_ORIGIN)
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Add an account; `false` if the public key is already held
    pub fn add_account(&mut self, public_key: PublicKey, private_data: Value) -> bool {
        self.registry
            .create_account(GLOBAL_ORIGIN, public_key, private_data)
    }

    pub fn read_account(&self, public_key: &PublicKey) -> Option<&Value> {
        self.registry.read_account(GLOBAL_ORIGIN, public_key)
    }

    /// Replace the data of an existing account, never inserts
    pub fn update_account(&mut self, public_key: &PublicKey, private_data: Value) -> bool {
        self.registry
            .update_account(GLOBAL_ORIGIN, public_key, private_data)
    }

    /// Remove an account by public key, returning its address
    pub fn delete_account(&mut self, public_key: &PublicKey) -> Option<Address> {
        self.registry.delete_account(GLOBAL_ORIGIN, public_key)
    }

    /// Public keys in insertion order
    pub fn list_accounts(&self) -> Vec<PublicKey> {
        self.registry.list_accounts(GLOBAL_ORIGIN)
    }

    /// Addresses in insertion order
    pub fn get_accounts(&self) -> Vec<Address> {
        self.registry.get_accounts(Some(GLOBAL_ORIGIN))
    }

    /// Public key and private data of the account at `address`
    ///
    /// The address may carry a `0x` prefix and use any case.
    pub fn export_account(&self, address: &str) -> Option<(&PublicKey, &Value)> {
        self.registry.export_account(address)
    }

    /// Remove the first account at `address`
    pub fn remove_account(&mut self, address: &str) -> bool {
        self.registry.remove_account(address)
    }

    /// Encode as `[[hexPublicKey, data], ...]`
    pub fn serialize(&self) -> Value {
        self.registry.serialize()
    }

    /// Replace all accounts from `[[hexPublicKey, data], ...]`
    ///
    /// Nothing changes if any entry fails to decode.
    pub fn deserialize(&mut self, wire: Value) -> Result<(), KeyringError> {
        self.registry.deserialize(wire)
    }

    pub fn sign_transaction(
        &self,
        address: &str,
        transaction: &Value,
    ) -> Result<Value, KeyringError> {
        self.registry.sign_transaction(address, transaction)
    }

    pub fn sign_message(&self, address: &str, message: &Value) -> Result<Value, KeyringError> {
        self.registry.sign_message(address, message)
    }
}

#[async_trait]
impl<D> Keyring for SnapKeyring<D>
where
    D: AddressDeriver + Send + Sync,
{
    async fn serialize(&self) -> Result<Value, KeyringError> {
        Ok(SnapKeyring::serialize(self))
    }

    async fn deserialize(&mut self, wire: Value) -> Result<(), KeyringError> {
        SnapKeyring::deserialize(self, wire)
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, KeyringError> {
        Ok(SnapKeyring::get_accounts(self))
    }

    async fn export_account(
        &self,
        address: &str,
    ) -> Result<Option<(PublicKey, Value)>, KeyringError> {
        Ok(SnapKeyring::export_account(self, address)
            .map(|(public_key, data)| (*public_key, data.clone())))
    }

    async fn remove_account(&mut self, address: &str) -> Result<bool, KeyringError> {
        Ok(SnapKeyring::remove_account(self, address))
    }

    async fn sign_transaction(
        &self,
        address: &str,
        transaction: &Value,
    ) -> Result<Value, KeyringError> {
        SnapKeyring::sign_transaction(self, address, transaction)
    }

    async fn sign_message(&self, address: &str, message: &Value) -> Result<Value, KeyringError> {
        SnapKeyring::sign_message(self, address, message)
    }
}
