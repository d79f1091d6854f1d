//! Accounts and the per-scope account collection

use crate::address::{Address, AddressDeriver};
use crate::public_key::PublicKey;
use serde_json::Value;

/// A public key paired with the opaque private data stored for it
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    public_key: PublicKey,
    private_data: Value,
}

impl Account {
    pub fn new(public_key: PublicKey, private_data: Value) -> Self {
        Self {
            public_key,
            private_data,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_data(&self) -> &Value {
        &self.private_data
    }
}

/// Ordered accounts of one scope, unique by public key
///
/// Linear scans throughout: scopes hold a handful of accounts and addresses
/// are re-derived on every lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct AccountList {
    accounts: Vec<Account>,
}

impl AccountList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub(crate) fn contains(&self, public_key: &PublicKey) -> bool {
        self.position(public_key).is_some()
    }

    /// Append unless the key is already present
    pub(crate) fn insert(&mut self, public_key: PublicKey, private_data: Value) -> bool {
        if self.contains(&public_key) {
            return false;
        }
        self.accounts.push(Account::new(public_key, private_data));
        true
    }

    pub(crate) fn get(&self, public_key: &PublicKey) -> Option<&Value> {
        self.position(public_key)
            .map(|index| &self.accounts[index].private_data)
    }

    /// Replace the data of an existing account, never inserts
    pub(crate) fn replace(&mut self, public_key: &PublicKey, private_data: Value) -> bool {
        match self.position(public_key) {
            Some(index) => {
                self.accounts[index].private_data = private_data;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, public_key: &PublicKey) -> Option<Account> {
        self.position(public_key)
            .map(|index| self.accounts.remove(index))
    }

    /// First account whose derived address matches `address`
    pub(crate) fn find_by_address<D: AddressDeriver>(
        &self,
        deriver: &D,
        address: &str,
    ) -> Option<&Account> {
        self.position_by_address(deriver, address)
            .map(|index| &self.accounts[index])
    }

    /// Remove the first account whose derived address matches `address`
    pub(crate) fn remove_by_address<D: AddressDeriver>(
        &mut self,
        deriver: &D,
        address: &str,
    ) -> Option<Account> {
        self.position_by_address(deriver, address)
            .map(|index| self.accounts.remove(index))
    }

    pub(crate) fn addresses<'a, D: AddressDeriver>(
        &'a self,
        deriver: &'a D,
    ) -> impl Iterator<Item = Address> + 'a {
        self.accounts
            .iter()
            .map(move |account| deriver.derive_address(&account.public_key))
    }

    fn position(&self, public_key: &PublicKey) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| &account.public_key == public_key)
    }

    fn position_by_address<D: AddressDeriver>(&self, deriver: &D, address: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| deriver.derive_address(&account.public_key).matches(address))
    }
}
