//! Error types for keyring operations
//!
//! Lookups that miss and duplicate inserts are routine outcomes and are
//! reported through `Option`/`bool` returns, not through this type.

use thiserror::Error;

/// Core error type for keyring operations
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum KeyringError {
    /// Public key bytes are not a 33-byte compressed or 64-byte raw SEC-1 key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Scope key component cannot be used to build a composite key
    #[error("Invalid scope key: {0}")]
    InvalidScopeKey(String),

    /// Malformed wire input passed to `deserialize`
    #[error("Decode error: {0}")]
    Decode(String),

    /// Operation will never be supported by this keyring
    #[error("{0} is not supported for the snap keyring")]
    Unsupported(String),

    /// Operation is pending integration with an external signer
    #[error("{0} is not implemented yet (TODO: external signer integration)")]
    NotImplemented(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// Helper functions for common error scenarios
impl KeyringError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an invalid public key error
    pub fn invalid_public_key(msg: impl Into<String>) -> Self {
        Self::InvalidPublicKey(msg.into())
    }
}
