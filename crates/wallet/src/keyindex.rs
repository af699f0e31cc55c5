use std::collections::BTreeMap;

use logwallet_consensus::Hash160;
use logwallet_keys::ExtendedKey;
use logwallet_primitives::encode_p2pkh_address;

/// Derived public key nodes by hash160, enumerated in ascending hash order.
#[derive(Clone, Debug, Default)]
pub struct KeyIndex {
    keys: BTreeMap<Hash160, ExtendedKey>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the public half of `node`, replacing any node with the same hash.
    pub fn insert(&mut self, node: &ExtendedKey) -> Hash160 {
        let hash = node.hash160();
        self.keys.insert(hash, node.neutered());
        hash
    }

    pub fn get(&self, hash: &Hash160) -> Option<&ExtendedKey> {
        self.keys.get(hash)
    }

    pub fn contains(&self, hash: &Hash160) -> bool {
        self.keys.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Hash160, &ExtendedKey)> {
        self.keys.iter()
    }

    pub fn addresses(&self, version: u8) -> Vec<String> {
        self.keys
            .keys()
            .map(|hash| encode_p2pkh_address(hash, version))
            .collect()
    }
}
