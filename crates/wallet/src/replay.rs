//! Folding replayed log records into wallet state.

use logwallet_consensus::ChainParams;
use logwallet_keys::ExtendedKey;
use logwallet_primitives::sha256d;
use logwallet_storage::{LogRecord, RecordMode, ReplayStats};

use crate::keyindex::KeyIndex;
use crate::records::{RecordKind, WalletTransaction};
use crate::txindex::{SpendSet, TransactionIndex};

/// Everything a wallet rebuilds from its log.
#[derive(Clone, Debug, Default)]
pub(crate) struct WalletState {
    pub master_key: Option<ExtendedKey>,
    pub keys: KeyIndex,
    pub transactions: TransactionIndex,
    pub spends: SpendSet,
    pub next_child_index: u32,
}

impl WalletState {
    pub fn insert_derived(&mut self, node: &ExtendedKey) {
        self.keys.insert(node);
        self.next_child_index = self
            .next_child_index
            .max(node.child_number().saturating_add(1));
    }

    pub fn insert_transaction(&mut self, record_hash: [u8; 32], wtx: WalletTransaction) {
        self.spends.add_inputs(&wtx.tx);
        self.transactions.insert(record_hash, wtx);
    }
}

/// Summary of a completed load.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadStats {
    pub master_keys: u64,
    pub keys: u64,
    pub transactions: u64,
    /// Records that were not applied: unknown tags, bad payloads, erasures.
    pub skipped: u64,
    pub truncated_bytes: u64,
}

impl LoadStats {
    pub(crate) fn absorb(&mut self, store: &ReplayStats) {
        self.skipped += store.skipped;
        self.truncated_bytes = store.truncated_bytes;
    }
}

pub(crate) struct Replayer<'a> {
    params: &'a ChainParams,
    pub state: WalletState,
    pub stats: LoadStats,
}

impl<'a> Replayer<'a> {
    pub fn new(params: &'a ChainParams) -> Self {
        Self {
            params,
            state: WalletState::default(),
            stats: LoadStats::default(),
        }
    }

    pub fn apply(&mut self, record: LogRecord<'_>) {
        let kind = RecordKind::classify(record.key);
        if record.mode != RecordMode::Write {
            logwallet_log::log_debug!("Ignoring {:?} record ({})", record.mode, kind.tag());
            self.stats.skipped += 1;
            return;
        }

        let outcome = match kind {
            RecordKind::MasterKey(payload) => self.apply_master_key(&payload, record.value),
            RecordKind::HdKey(payload) => self.apply_hd_key(&payload, record.value),
            RecordKind::Transaction(payload) => self.apply_transaction(payload, record.value),
            RecordKind::Unknown => Err("unrecognized key"),
        };
        if let Err(reason) = outcome {
            logwallet_log::log_warn!(
                "Skipping wallet record (tag {}, key {} bytes): {reason}",
                kind.tag(),
                record.key.len()
            );
            self.stats.skipped += 1;
        }
    }

    fn apply_master_key(&mut self, payload: &[u8; 32], value: &[u8]) -> Result<(), &'static str> {
        if self.state.master_key.is_some() {
            return Err("master key already present");
        }
        let node = self.decode_node(value)?;
        if !node.has_private_key() {
            return Err("master key record has no private key");
        }
        if &sha256d(node.public_key()) != payload {
            return Err("master key does not match record key");
        }
        self.state.master_key = Some(node);
        self.stats.master_keys += 1;
        Ok(())
    }

    fn apply_hd_key(&mut self, payload: &[u8; 20], value: &[u8]) -> Result<(), &'static str> {
        let node = self.decode_node(value)?;
        if &node.hash160() != payload {
            return Err("derived key does not match record key");
        }
        self.state.insert_derived(&node);
        self.stats.keys += 1;
        Ok(())
    }

    fn apply_transaction(&mut self, payload: [u8; 32], value: &[u8]) -> Result<(), &'static str> {
        let wtx = WalletTransaction::deserialize(value).map_err(|_| "undecodable transaction")?;
        self.state.insert_transaction(payload, wtx);
        self.stats.transactions += 1;
        Ok(())
    }

    fn decode_node(&self, value: &[u8]) -> Result<ExtendedKey, &'static str> {
        let text = std::str::from_utf8(value).map_err(|_| "key node is not text")?;
        ExtendedKey::deserialize(text, self.params).map_err(|_| "undecodable key node")
    }
}
