//! Keyring deployment configuration
//!
//! Chooses the scoping strategy (and with it the wire shape) and how signing
//! requests fail. Hosts typically embed this in their own configuration file;
//! the keyring itself reads no environment variables.

use crate::error::KeyringError;
use crate::scope::ScopeMode;
use serde::{Deserialize, Serialize};

/// How signing requests are refused
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignerStatus {
    /// Signing is waiting on an external signer integration
    Pending,
    /// Signing is permanently out of scope for this keyring
    #[default]
    Unsupported,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyringConfig {
    /// Scoping strategy and wire shape
    pub scope_mode: ScopeMode,
    /// Failure variant reported by signing operations
    pub signer: SignerStatus,
}

impl KeyringConfig {
    /// Parse configuration from JSON
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use snap_keyring::{KeyringConfig, ScopeMode};
    /// let config = KeyringConfig::from_json_str(r#"{"scopeMode": "byComposite"}"#).unwrap();
    /// assert_eq!(config.scope_mode, ScopeMode::ByComposite);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, KeyringError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KeyringError::InvalidConfiguration(e.to_string()))?;
        log::debug!(
            "Loaded keyring config: scope mode {}, signer {:?}",
            config.scope_mode,
            config.signer
        );
        Ok(config)
    }

    /// Flat, unscoped deployment
    pub fn flat() -> Self {
        Self {
            scope_mode: ScopeMode::Flat,
            ..Default::default()
        }
    }

    /// Deployment scoped by composite `(snap id, origin)` keys
    pub fn composite() -> Self {
        Self {
            scope_mode: ScopeMode::ByComposite,
            ..Default::default()
        }
    }

    /// Same configuration with signing reported as pending
    pub fn with_pending_signer(mut self) -> Self {
        self.signer = SignerStatus::Pending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_by_origin_unsupported() {
        let config = KeyringConfig::default();
        assert_eq!(config.scope_mode, ScopeMode::ByOrigin);
        assert_eq!(config.signer, SignerStatus::Unsupported);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = KeyringConfig::from_json_str(r#"{"signer": "pending"}"#).unwrap();
        assert_eq!(config.scope_mode, ScopeMode::ByOrigin);
        assert_eq!(config.signer, SignerStatus::Pending);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = KeyringConfig::from_json_str(r#"{"scopeMode": "bySnap"}"#).unwrap_err();
        assert!(matches!(err, KeyringError::InvalidConfiguration(_)));
    }
}
