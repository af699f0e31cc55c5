use std::collections::BTreeMap;

use logwallet_consensus::Hash256;
use logwallet_primitives::{OutPoint, Transaction};

use crate::records::WalletTransaction;

/// Wallet transactions keyed by record hash, enumerated in ascending key order.
#[derive(Clone, Debug, Default)]
pub struct TransactionIndex {
    transactions: BTreeMap<Hash256, WalletTransaction>,
}

impl TransactionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record_hash: Hash256, wtx: WalletTransaction) {
        self.transactions.insert(record_hash, wtx);
    }

    pub fn get(&self, record_hash: &Hash256) -> Option<&WalletTransaction> {
        self.transactions.get(record_hash)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Hash256, &WalletTransaction)> {
        self.transactions.iter()
    }
}

/// Outpoints consumed by wallet transactions. Only ever grows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SpendSet {
    spent: Vec<OutPoint>,
}

impl SpendSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every input of a non-coinbase transaction; returns how many.
    pub fn add_inputs(&mut self, tx: &Transaction) -> usize {
        if tx.is_coinbase() {
            return 0;
        }
        self.spent.extend(tx.vin.iter().map(|input| input.prevout));
        tx.vin.len()
    }

    /// Newest entries are checked first.
    pub fn is_spent(&self, hash: &Hash256, index: u32) -> bool {
        self.spent
            .iter()
            .rev()
            .any(|outpoint| outpoint.index == index && &outpoint.hash == hash)
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }

    pub fn as_slice(&self) -> &[OutPoint] {
        &self.spent
    }
}
