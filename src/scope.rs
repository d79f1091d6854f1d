//! Account scoping
//!
//! A registry groups accounts by a scope key. Each deployment picks exactly
//! one [`ScopeMode`], which also fixes the wire shape produced by
//! `serialize`:
//!
//! - `Flat`: a single implicit scope, [`GLOBAL_ORIGIN`]
//! - `ByOrigin`: one scope per origin string
//! - `ByComposite`: one scope per `(snap id, origin)` pair, stored under a
//!   [`CompositeKey`]

use crate::error::KeyringError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope key used by unscoped keyrings
pub const GLOBAL_ORIGIN: &str = "";

/// Separator between the two components of a composite key
pub const COMPOSITE_SEPARATOR: char = ' ';

/// Scoping strategy of a deployment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeMode {
    /// Unscoped, `[[hexKey, data], ...]`
    Flat,
    /// `{ origin: [[hexKey, data], ...] }`
    #[default]
    ByOrigin,
    /// `{ "snapId origin": { hexKey: data } }`
    ByComposite,
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::ByOrigin => write!(f, "by-origin"),
            Self::ByComposite => write!(f, "by-composite"),
        }
    }
}

/// `(snap id, origin)` pair joined into one canonical string key
///
/// Neither component may be empty or contain the separator, so the join is
/// reversible.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    key: String,
    split: usize,
}

impl CompositeKey {
    pub fn new(snap_id: &str, origin: &str) -> Result<Self, KeyringError> {
        validate_component("snap id", snap_id)?;
        validate_component("origin", origin)?;

        Ok(Self {
            key: format!("{}{}{}", snap_id, COMPOSITE_SEPARATOR, origin),
            split: snap_id.len(),
        })
    }

    /// Parse a key produced by [`CompositeKey::as_str`]
    pub fn parse(key: &str) -> Result<Self, KeyringError> {
        let (snap_id, origin) = key.split_once(COMPOSITE_SEPARATOR).ok_or_else(|| {
            KeyringError::InvalidScopeKey(format!("missing separator in {:?}", key))
        })?;
        Self::new(snap_id, origin)
    }

    pub fn snap_id(&self) -> &str {
        &self.key[..self.split]
    }

    pub fn origin(&self) -> &str {
        &self.key[self.split + COMPOSITE_SEPARATOR.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

fn validate_component(name: &str, value: &str) -> Result<(), KeyringError> {
    if value.is_empty() {
        return Err(KeyringError::InvalidScopeKey(format!("{} is empty", name)));
    }
    if value.contains(COMPOSITE_SEPARATOR) {
        return Err(KeyringError::InvalidScopeKey(format!(
            "{} {:?} contains the separator",
            name, value
        )));
    }
    Ok(())
}
