//! Account public keys
//!
//! Accounts are identified by a SEC-1 encoded secp256k1 public key in one of
//! two forms:
//!
//! - **Compressed**: 33 bytes (`0x02`/`0x03` parity tag + X). Must be a valid
//!   curve point, since address derivation needs the full point.
//! - **Raw**: 64 bytes (X || Y, the uncompressed form without the `0x04` tag).
//!   Hashed as-is; curve membership is not checked.

use crate::error::KeyringError;
use std::fmt;

/// Length of a compressed SEC-1 public key
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key body (no `0x04` tag)
pub const RAW_LEN: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Repr {
    Compressed(secp256k1::PublicKey),
    Raw([u8; RAW_LEN]),
}

/// Public key of an account, compared byte-for-byte
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(Repr);

impl PublicKey {
    /// Build a public key from its SEC-1 bytes
    ///
    /// # Errors
    ///
    /// `InvalidPublicKey` if the length is neither 33 nor 64, or a 33-byte
    /// key is not a point on secp256k1.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyringError> {
        match bytes.len() {
            COMPRESSED_LEN => {
                let point = secp256k1::PublicKey::from_slice(bytes)
                    .map_err(|e| KeyringError::invalid_public_key(e.to_string()))?;
                Ok(Self(Repr::Compressed(point)))
            }
            RAW_LEN => {
                let mut raw = [0u8; RAW_LEN];
                raw.copy_from_slice(bytes);
                Ok(Self(Repr::Raw(raw)))
            }
            other => Err(KeyringError::invalid_public_key(format!(
                "expected {} or {} bytes, got {}",
                COMPRESSED_LEN, RAW_LEN, other
            ))),
        }
    }

    /// Parse a hex encoded public key (optional `0x` prefix, any case)
    pub fn from_hex(input: &str) -> Result<Self, KeyringError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        let bytes =
            hex::decode(digits).map_err(|e| KeyringError::invalid_public_key(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// SEC-1 bytes exactly as supplied at construction
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.0 {
            Repr::Compressed(point) => point.serialize().to_vec(),
            Repr::Raw(raw) => raw.to_vec(),
        }
    }

    /// Lowercase hex without prefix, the wire encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Whether the key was supplied in compressed form
    pub fn is_compressed(&self) -> bool {
        matches!(self.0, Repr::Compressed(_))
    }

    /// The 64-byte X || Y body that addresses are hashed from
    pub(crate) fn uncompressed_body(&self) -> [u8; RAW_LEN] {
        match &self.0 {
            Repr::Compressed(point) => {
                let full = point.serialize_uncompressed();
                let mut body = [0u8; RAW_LEN];
                body.copy_from_slice(&full[1..]);
                body
            }
            Repr::Raw(raw) => *raw,
        }
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(point: secp256k1::PublicKey) -> Self {
        Self(Repr::Compressed(point))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyringError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form = if self.is_compressed() { "compressed" } else { "raw" };
        write!(f, "PublicKey({} {})", form, self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
