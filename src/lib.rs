//! Snap Keyring: account registry for arbitrary JSON private data
//!
//! Each account is a public key (33-byte compressed or 64-byte raw SEC-1)
//! paired with private data that is any JSON value. Callers refer to
//! accounts by their Ethereum address, derived from the public key.
//!
//! The keyring performs no signing. It holds private data on behalf of an
//! external signer (a snap) that consumes it out of band, and every signing
//! request fails.
//!
//! # Architecture
//!
//! - **AccountRegistry**: accounts grouped by origin or `(snap id, origin)`
//! - **SnapKeyring**: the unscoped variant, one implicit scope
//! - **AddressDeriver**: public key to address, Keccak-256 by default
//! - **Codec**: JSON wire shapes used by `serialize`/`deserialize`
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use snap_keyring::{AccountRegistry, PublicKey};
//!
//! let mut registry = AccountRegistry::new();
//! let key = PublicKey::from_slice(&[0xde; 64]).unwrap();
//!
//! registry.create_account("https://dapp.io", key, json!({"secret": "a"}));
//! let address = registry.delete_account("https://dapp.io", &key).unwrap();
//! assert!(address.as_str().starts_with("0x"));
//! ```

// Public modules
pub mod account;
pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod keyring;
pub mod public_key;
pub mod registry;
pub mod scope;

// Re-exports for convenience
pub use account::Account;
pub use address::{normalize_address, Address, AddressDeriver, KeccakDeriver};
pub use config::{KeyringConfig, SignerStatus};
pub use error::KeyringError;
pub use keyring::{keyring_from_config, Keyring, SnapKeyring, KEYRING_TYPE};
pub use public_key::PublicKey;
pub use registry::AccountRegistry;
pub use scope::{CompositeKey, ScopeMode, GLOBAL_ORIGIN};

// Common result type
pub type Result<T> = std::result::Result<T, KeyringError>;
