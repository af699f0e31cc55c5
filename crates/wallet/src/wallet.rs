use std::path::Path;

use logwallet_consensus::constants::COINBASE_MATURITY;
use logwallet_consensus::money::Amount;
use logwallet_consensus::{ChainParams, Hash160, Hash256};
use logwallet_keys::ExtendedKey;
use logwallet_primitives::{decode_p2pkh_address, sha256d, OutPoint, TxOut};
use logwallet_script::solve_script_pubkey;
use logwallet_storage::file::FileRecordLog;
use logwallet_storage::{RecordKey, RecordStore};

use crate::config::WalletConfig;
use crate::records::{hd_key_record, master_key_record, tx_record, RecordKind, WalletTransaction};
use crate::replay::{LoadStats, Replayer, WalletState};
use crate::txindex::{SpendSet, TransactionIndex};
use crate::WalletError;

/// An unspent output owned by the wallet, carrying a copy of its transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub wtx: WalletTransaction,
    pub index: u32,
}

impl Output {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.wtx.txid(), self.index)
    }

    pub fn txout(&self) -> Option<&TxOut> {
        self.wtx.tx.vout.get(self.index as usize)
    }
}

/// Single-writer wallet over an append-only record store.
pub struct Wallet {
    params: ChainParams,
    flush_on_derive: bool,
    store: Option<Box<dyn RecordStore>>,
    state: WalletState,
    best_block_height: u32,
}

impl Wallet {
    pub fn new(config: &WalletConfig) -> Self {
        Self {
            params: config.chain_params(),
            flush_on_derive: config.flush_on_derive,
            store: None,
            state: WalletState::default(),
            best_block_height: 0,
        }
    }

    /// Opens (creating if absent) the log file at `path` and replays it.
    pub fn load(&mut self, path: &Path) -> Result<LoadStats, WalletError> {
        if self.store.is_some() {
            return Err(WalletError::AlreadyOpen);
        }
        let create = !path.exists();
        let log = FileRecordLog::open(path, create)?;
        self.load_store(log)
    }

    pub fn load_store<S>(&mut self, store: S) -> Result<LoadStats, WalletError>
    where
        S: RecordStore + 'static,
    {
        if self.store.is_some() {
            return Err(WalletError::AlreadyOpen);
        }
        let mut store: Box<dyn RecordStore> = Box::new(store);

        let mut replayer = Replayer::new(&self.params);
        let replay_stats = store.replay(&mut |record| {
            replayer.apply(record);
            Ok(())
        })?;
        let Replayer {
            state, mut stats, ..
        } = replayer;
        stats.absorb(&replay_stats);

        logwallet_log::log_info!(
            "Wallet loaded: {} keys, {} transactions, {} spends, master key {}, next child index {}, {} records skipped",
            state.keys.len(),
            state.transactions.len(),
            state.spends.len(),
            if state.master_key.is_some() { "present" } else { "absent" },
            state.next_child_index,
            stats.skipped
        );

        self.state = state;
        self.store = Some(store);
        Ok(stats)
    }

    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    pub fn flush(&mut self) -> Result<(), WalletError> {
        self.store_mut()?.flush()?;
        Ok(())
    }

    /// Flushes and releases the store, discarding all in-memory state.
    pub fn close(&mut self) -> Result<(), WalletError> {
        let Some(mut store) = self.store.take() else {
            return Ok(());
        };
        let flushed = store.flush();
        drop(store);
        self.state = WalletState::default();
        flushed?;
        Ok(())
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    pub fn best_block_height(&self) -> u32 {
        self.best_block_height
    }

    pub fn set_best_block_height(&mut self, height: u32) {
        self.best_block_height = height;
    }

    pub fn master_key(&self) -> Option<&ExtendedKey> {
        self.state.master_key.as_ref()
    }

    pub fn next_child_index(&self) -> u32 {
        self.state.next_child_index
    }

    pub fn key_count(&self) -> usize {
        self.state.keys.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.state.transactions.len()
    }

    pub fn transactions(&self) -> &TransactionIndex {
        &self.state.transactions
    }

    pub fn get_transaction(&self, record_hash: &Hash256) -> Option<&WalletTransaction> {
        self.state.transactions.get(record_hash)
    }

    pub fn spends(&self) -> &SpendSet {
        &self.state.spends
    }

    /// Replaces the master key. The old node, if any, is discarded.
    pub fn set_master_key(&mut self, node: &ExtendedKey) -> Result<(), WalletError> {
        if !node.has_private_key() {
            return Err(WalletError::MissingPrivateKey);
        }
        let value = node.serialize_private(&self.params)?;
        let key = master_key_record(&sha256d(node.public_key()));
        self.append(&key, value.as_bytes())?;

        if let Some(previous) = &self.state.master_key {
            logwallet_log::log_warn!(
                "Replacing wallet master key {:08x} with {:08x}",
                u32::from_be_bytes(previous.fingerprint()),
                u32::from_be_bytes(node.fingerprint())
            );
        }
        self.state.master_key = Some(node.clone());
        Ok(())
    }

    /// Derives the key at `next_child_index`, persisting only its public half.
    ///
    /// Once the record is appended the key is kept in memory even if the
    /// following flush fails, matching what a replay of the log would hold.
    pub fn next_key(&mut self) -> Result<ExtendedKey, WalletError> {
        let master = self
            .state
            .master_key
            .as_ref()
            .ok_or(WalletError::MissingMasterKey)?;
        let child_index = self.state.next_child_index;
        let node = master.derive_private_child(child_index)?;

        let value = node.serialize_public(&self.params);
        self.append(&hd_key_record(&node.hash160()), value.as_bytes())?;
        self.state.insert_derived(&node);
        logwallet_log::log_debug!("Derived wallet key at child index {child_index}");

        if self.flush_on_derive {
            self.flush()?;
        }
        Ok(node)
    }

    /// Known addresses in ascending hash160 order.
    pub fn get_addresses(&self) -> Vec<String> {
        self.state.keys.addresses(self.params.b58prefix_pubkey_address)
    }

    /// Looks up a derived key by address text, failing on undecodable text.
    pub fn lookup_address(&self, address: &str) -> Result<Option<&ExtendedKey>, WalletError> {
        let hash = decode_p2pkh_address(address, self.params.b58prefix_pubkey_address)?;
        Ok(self.state.keys.get(&hash))
    }

    pub fn find_key(&self, address: &str) -> Option<&ExtendedKey> {
        self.lookup_address(address).ok().flatten()
    }

    pub fn have_key(&self, hash: &Hash160) -> bool {
        self.state.keys.contains(hash)
    }

    /// Persists `wtx` and records its inputs as spent. Returns the record hash.
    pub fn add_transaction(&mut self, wtx: WalletTransaction) -> Result<Hash256, WalletError> {
        let value = wtx.serialize();
        let record_hash = sha256d(&value);
        self.append(&tx_record(&record_hash), &value)?;
        self.state.insert_transaction(record_hash, wtx);
        Ok(record_hash)
    }

    pub fn is_spent(&self, hash: &Hash256, index: u32) -> bool {
        self.state.spends.is_spent(hash, index)
    }

    /// Pay-to-pubkey-hash outputs to a known key. Nothing else counts.
    pub fn txout_is_mine(&self, txout: &TxOut) -> bool {
        solve_script_pubkey(&txout.script_pubkey)
            .pubkey_hash()
            .is_some_and(|hash| self.state.keys.contains(hash))
    }

    /// Value of the unspent outputs of `wtx` that belong to this wallet.
    pub fn wtx_credit(&self, wtx: &WalletTransaction) -> Amount {
        self.spendable_outputs(wtx)
            .map(|(_, txout)| txout.value)
            .sum()
    }

    pub fn get_balance(&self) -> Amount {
        self.state
            .transactions
            .iter()
            .map(|(_, wtx)| self.wtx_credit(wtx))
            .sum()
    }

    pub fn get_unspent(&self) -> Vec<Output> {
        let mut outputs = Vec::new();
        for (_, wtx) in self.state.transactions.iter() {
            for (index, _) in self.spendable_outputs(wtx) {
                outputs.push(Output {
                    wtx: wtx.clone(),
                    index,
                });
            }
        }
        outputs
    }

    fn spendable_outputs<'a>(
        &'a self,
        wtx: &'a WalletTransaction,
    ) -> impl Iterator<Item = (u32, &'a TxOut)> + 'a {
        let txid = wtx.txid();
        let mature = !self.is_immature_coinbase(wtx);
        wtx.tx
            .vout
            .iter()
            .enumerate()
            .filter(move |_| mature)
            .map(|(index, txout)| (index as u32, txout))
            .filter(move |(index, txout)| {
                !self.state.spends.is_spent(&txid, *index) && self.txout_is_mine(txout)
            })
    }

    fn is_immature_coinbase(&self, wtx: &WalletTransaction) -> bool {
        if !wtx.tx.is_coinbase() {
            return false;
        }
        self.best_block_height < COINBASE_MATURITY
            || wtx.height > self.best_block_height - COINBASE_MATURITY
    }

    fn store_mut(&mut self) -> Result<&mut Box<dyn RecordStore>, WalletError> {
        self.store.as_mut().ok_or(WalletError::NotLoaded)
    }

    fn append(&mut self, key: &RecordKey, value: &[u8]) -> Result<(), WalletError> {
        self.store_mut()?.append(key.as_slice(), value)?;
        logwallet_log::log_debug!(
            "Appended {} record (key {} bytes, value {} bytes)",
            RecordKind::classify(key.as_slice()).tag(),
            key.len(),
            value.len()
        );
        Ok(())
    }
}

impl Drop for Wallet {
    fn drop(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.flush() {
                logwallet_log::log_warn!("Failed to flush wallet store on drop: {err}");
            }
        }
    }
}
