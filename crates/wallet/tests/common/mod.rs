#![allow(dead_code)]

use logwallet::{Wallet, WalletConfig, WalletTransaction};
use logwallet_consensus::money::Amount;
use logwallet_consensus::Hash160;
use logwallet_keys::ExtendedKey;
use logwallet_primitives::{p2pkh_script, OutPoint, Transaction, TxIn, TxOut};
use logwallet_storage::memory::MemoryRecordLog;

pub const SEED: [u8; 32] = [0x5a; 32];

pub fn master() -> ExtendedKey {
    ExtendedKey::from_seed(&SEED).expect("master from seed")
}

pub fn memory_wallet(log: &MemoryRecordLog) -> Wallet {
    let mut wallet = Wallet::new(&WalletConfig::default());
    wallet.load_store(log.clone()).expect("load memory log");
    wallet
}

pub fn wallet_with_master(log: &MemoryRecordLog) -> Wallet {
    let mut wallet = memory_wallet(log);
    wallet.set_master_key(&master()).expect("set master key");
    wallet
}

pub fn payment(prevouts: &[OutPoint], outputs: &[(Vec<u8>, Amount)]) -> Transaction {
    Transaction {
        version: 1,
        vin: prevouts
            .iter()
            .map(|prevout| TxIn {
                prevout: *prevout,
                script_sig: vec![0x00],
                sequence: u32::MAX,
            })
            .collect(),
        vout: outputs
            .iter()
            .map(|(script_pubkey, value)| TxOut {
                value: *value,
                script_pubkey: script_pubkey.clone(),
            })
            .collect(),
        lock_time: 0,
    }
}

pub fn coinbase(to: &Hash160, value: Amount) -> Transaction {
    payment(&[OutPoint::null()], &[(p2pkh_script(to), value)])
}

/// A non-coinbase transaction funding `to` from an outpoint outside the wallet.
pub fn funding(to: &Hash160, value: Amount, nonce: u8) -> WalletTransaction {
    WalletTransaction::new(
        10,
        payment(
            &[OutPoint::new([nonce; 32], 0)],
            &[(p2pkh_script(to), value)],
        ),
    )
}
