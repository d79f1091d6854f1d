//! Account addresses
//!
//! Addresses follow the Ethereum rule: the right-most 20 bytes of
//! `Keccak256(X || Y)` over the uncompressed public key body, rendered as
//! `0x` + 40 lowercase hex digits.
//!
//! Inputs accept an optional `0x` prefix in either case and hex digits in
//! either case; see [`normalize_address`].

use crate::public_key::PublicKey;
use sha3::{Digest, Keccak256};
use std::fmt;

/// Number of bytes in an address
pub const ADDRESS_LEN: usize = 20;

/// Derived account address, always `0x`-prefixed lowercase hex
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Render 20 address bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Full `0x`-prefixed form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digits without the prefix
    pub fn digits(&self) -> &str {
        &self.0[2..]
    }

    /// Compare against a caller supplied address in any accepted spelling
    pub fn matches(&self, input: &str) -> bool {
        self.digits() == normalize_address(input)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Strip an optional `0x`/`0X` prefix and lowercase the rest
///
/// No length or alphabet check is done: a malformed address simply never
/// matches a derived one.
pub fn normalize_address(input: &str) -> String {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    digits.to_ascii_lowercase()
}

/// Maps a public key to its address
///
/// Implementations must be pure: the same key bytes always yield the same
/// address. Registries re-derive on every lookup and never cache results.
pub trait AddressDeriver {
    fn derive_address(&self, public_key: &PublicKey) -> Address;
}

/// Ethereum address derivation (Keccak-256)
#[derive(Clone, Copy, Debug, Default)]
pub struct KeccakDeriver;

impl AddressDeriver for KeccakDeriver {
    fn derive_address(&self, public_key: &PublicKey) -> Address {
        let digest = Keccak256::digest(public_key.uncompressed_body());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Address::from_bytes(bytes)
    }
}
