mod common;

use logwallet::{Wallet, WalletConfig, WalletError, WalletTransaction};
use logwallet_log::Level;
use logwallet_primitives::{p2pkh_script, OutPoint};
use logwallet_storage::memory::MemoryRecordLog;
use logwallet_storage::{RecordMode, StoreError};

use common::{funding, master, memory_wallet, payment, wallet_with_master};

#[test]
fn reopened_file_wallet_matches_live_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wallet.log");

    let mut wallet = Wallet::new(&WalletConfig::default());
    wallet.load(&path).expect("create");
    wallet.set_master_key(&master()).expect("master");
    let first = wallet.next_key().expect("key 0");
    let second = wallet.next_key().expect("key 1");
    let _third = wallet.next_key().expect("key 2");

    let fund_a = funding(&first.hash160(), 40_000, 1);
    let fund_b = funding(&second.hash160(), 2_500, 2);
    wallet.add_transaction(fund_a.clone()).expect("fund a");
    wallet.add_transaction(fund_b).expect("fund b");
    wallet
        .add_transaction(WalletTransaction::new(
            12,
            payment(
                &[OutPoint::new(fund_a.txid(), 0)],
                &[(p2pkh_script(&second.hash160()), 39_000)],
            ),
        ))
        .expect("spend a");
    wallet.set_best_block_height(20);

    let addresses = wallet.get_addresses();
    let balance = wallet.get_balance();
    let unspent = wallet.get_unspent();
    let spends = wallet.spends().clone();
    let next_child_index = wallet.next_child_index();
    assert_eq!(balance, 41_500);
    assert_eq!(unspent.len(), 2);
    wallet.close().expect("close");
    assert!(!wallet.is_loaded());
    assert_eq!(wallet.key_count(), 0);

    let mut reopened = Wallet::new(&WalletConfig::default());
    let stats = reopened.load(&path).expect("reopen");
    reopened.set_best_block_height(20);
    assert_eq!(stats.master_keys, 1);
    assert_eq!(stats.keys, 3);
    assert_eq!(stats.transactions, 3);
    assert_eq!(stats.skipped, 0);

    assert_eq!(reopened.master_key(), Some(&master()));
    assert_eq!(reopened.get_addresses(), addresses);
    assert_eq!(reopened.get_balance(), balance);
    assert_eq!(reopened.get_unspent(), unspent);
    assert_eq!(reopened.spends(), &spends);
    assert_eq!(reopened.next_child_index(), next_child_index);
    assert_eq!(reopened.transaction_count(), 3);
}

#[test]
fn derived_keys_continue_after_reload() {
    let log = MemoryRecordLog::new();
    {
        let mut wallet = wallet_with_master(&log);
        for expected in 0..4 {
            let node = wallet.next_key().expect("derive");
            assert_eq!(node.child_number(), expected);
            assert!(node.has_private_key());
        }
        assert_eq!(wallet.next_child_index(), 4);
    }

    let mut wallet = memory_wallet(&log);
    assert_eq!(wallet.next_child_index(), 4);
    assert_eq!(wallet.key_count(), 4);
    let node = wallet.next_key().expect("derive after reload");
    assert_eq!(node.child_number(), 4);
    assert_eq!(
        node,
        master().derive_private_child(4).expect("direct derivation")
    );
}

#[test]
fn child_index_is_recomputed_from_maximum() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    wallet.next_key().expect("derive");
    drop(wallet);

    // Records appended out of order by another writer.
    let params = WalletConfig::default().chain_params();
    let master = master();
    for child in [7u32, 3] {
        let node = master.derive_private_child(child).expect("child");
        let mut key = b"hdkey".to_vec();
        key.extend_from_slice(&node.hash160());
        log.push_raw(
            RecordMode::Write,
            &key,
            node.serialize_public(&params).as_bytes(),
        )
        .expect("push");
    }

    let wallet = memory_wallet(&log);
    assert_eq!(wallet.next_child_index(), 8);
    assert_eq!(wallet.key_count(), 3);
}

#[test]
fn malformed_records_do_not_abort_load() {
    let log = MemoryRecordLog::new();
    let key_hash = {
        let mut wallet = wallet_with_master(&log);
        let node = wallet.next_key().expect("derive");
        wallet
            .add_transaction(funding(&node.hash160(), 1_000, 3))
            .expect("fund");
        node.hash160()
    };

    let mut short_tx = b"tx".to_vec();
    short_tx.extend_from_slice(&[0u8; 16]);
    log.push_raw(RecordMode::Write, &short_tx, b"junk").expect("push");
    let mut bad_tx = b"tx".to_vec();
    bad_tx.extend_from_slice(&[1u8; 32]);
    log.push_raw(RecordMode::Write, &bad_tx, &[0xff; 3]).expect("push");
    let mut bad_key = b"hdkey".to_vec();
    bad_key.extend_from_slice(&[2u8; 20]);
    log.push_raw(RecordMode::Write, &bad_key, b"xpub-not-really")
        .expect("push");
    log.push_raw(RecordMode::Write, b"version", &[1, 0, 0, 0])
        .expect("push");
    log.push_raw(RecordMode::Erase, &bad_tx, &[]).expect("push");

    let mut wallet = memory_wallet(&log);
    wallet.set_best_block_height(100);
    assert!(wallet.master_key().is_some());
    assert!(wallet.have_key(&key_hash));
    assert_eq!(wallet.key_count(), 1);
    assert_eq!(wallet.transaction_count(), 1);
    assert_eq!(wallet.get_balance(), 1_000);

    let stats = {
        wallet.close().expect("close");
        wallet.load_store(log.clone()).expect("reload")
    };
    assert_eq!(stats.skipped, 5);
}

#[test]
fn second_load_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wallet.log");

    let mut wallet = Wallet::new(&WalletConfig::default());
    wallet.load(&path).expect("load");
    assert!(matches!(wallet.load(&path), Err(WalletError::AlreadyOpen)));
    assert!(matches!(
        wallet.load_store(MemoryRecordLog::new()),
        Err(WalletError::AlreadyOpen)
    ));

    // Another wallet cannot take the same file while it is held.
    let mut other = Wallet::new(&WalletConfig::default());
    assert!(matches!(
        other.load(&path),
        Err(WalletError::Store(StoreError::AlreadyOpen(_)))
    ));
    assert!(!other.is_loaded());

    wallet.close().expect("close");
    other.load(&path).expect("load after close");
}

#[test]
fn failed_appends_leave_state_untouched() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    let node = wallet.next_key().expect("derive");
    let records_before = log.len();

    log.set_fail_appends(true);
    assert!(matches!(
        wallet.next_key(),
        Err(WalletError::Store(StoreError::Io(_)))
    ));
    assert_eq!(wallet.next_child_index(), 1);
    assert_eq!(wallet.key_count(), 1);

    assert!(wallet
        .add_transaction(funding(&node.hash160(), 5_000, 4))
        .is_err());
    assert_eq!(wallet.transaction_count(), 0);
    assert!(wallet.spends().is_empty());

    let replacement = logwallet_keys::ExtendedKey::from_seed(&[0x11; 32]).expect("seed");
    assert!(wallet.set_master_key(&replacement).is_err());
    assert_eq!(wallet.master_key(), Some(&master()));
    assert_eq!(log.len(), records_before);

    log.set_fail_appends(false);
    let retried = wallet.next_key().expect("retry");
    assert_eq!(retried.child_number(), 1);
}

#[test]
fn first_master_key_wins_on_replay() {
    let log = MemoryRecordLog::new();
    let replacement = logwallet_keys::ExtendedKey::from_seed(&[0x22; 32]).expect("seed");
    {
        let mut wallet = wallet_with_master(&log);
        wallet.set_master_key(&replacement).expect("replace");
        assert_eq!(wallet.master_key(), Some(&replacement));
    }
    let wallet = memory_wallet(&log);
    assert_eq!(wallet.master_key(), Some(&master()));
}

#[test]
fn master_key_requires_private_half() {
    let log = MemoryRecordLog::new();
    let mut wallet = memory_wallet(&log);
    assert!(matches!(
        wallet.set_master_key(&master().neutered()),
        Err(WalletError::MissingPrivateKey)
    ));
    assert!(log.is_empty());
}

#[test]
fn flush_on_derive_is_configurable() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    wallet.next_key().expect("derive");
    wallet.next_key().expect("derive");
    assert_eq!(log.flush_count(), 2);

    let quiet_log = MemoryRecordLog::new();
    let config = WalletConfig::parse("flushonderive=0").expect("config");
    let mut quiet = Wallet::new(&config);
    quiet.load_store(quiet_log.clone()).expect("load");
    quiet.set_master_key(&master()).expect("master");
    quiet.next_key().expect("derive");
    assert_eq!(quiet_log.flush_count(), 0);
}

fn warned(needle: &str) -> bool {
    logwallet_log::capture_snapshot(1024)
        .into_iter()
        .any(|entry| entry.level == Level::Warn && entry.msg.contains(needle))
}

#[test]
fn skipped_records_are_logged() {
    logwallet_log::enable_capture(1024);
    let log = MemoryRecordLog::new();
    log.push_raw(RecordMode::Write, b"bogus-record-key", b"value")
        .expect("push");

    let mut wallet = Wallet::new(&WalletConfig::default());
    let stats = wallet.load_store(log.clone()).expect("load");
    assert_eq!(stats.skipped, 1);
    assert!(
        warned("Skipping wallet record (tag unknown, key 16 bytes): unrecognized key"),
        "skipped record was not logged"
    );
}

#[test]
fn master_key_replacement_is_logged() {
    logwallet_log::enable_capture(1024);
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    let replacement = logwallet_keys::ExtendedKey::from_seed(&[0x33; 32]).expect("seed");
    wallet.set_master_key(&replacement).expect("replace");

    let expected = format!(
        "Replacing wallet master key {:08x} with {:08x}",
        u32::from_be_bytes(master().fingerprint()),
        u32::from_be_bytes(replacement.fingerprint())
    );
    assert!(warned(&expected), "master key replacement was not logged");
}

#[test]
fn failed_flush_after_derive_keeps_appended_key() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    wallet.next_key().expect("derive");

    log.set_fail_flushes(true);
    assert!(matches!(
        wallet.next_key(),
        Err(WalletError::Store(StoreError::Io(_)))
    ));
    assert_eq!(wallet.next_child_index(), 2);
    assert_eq!(wallet.key_count(), 2);
    let live = wallet.get_addresses();
    log.set_fail_flushes(false);
    drop(wallet);

    let replayed = memory_wallet(&log);
    assert_eq!(replayed.next_child_index(), 2);
    assert_eq!(replayed.get_addresses(), live);
}
