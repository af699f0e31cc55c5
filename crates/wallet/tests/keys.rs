mod common;

use logwallet::{Wallet, WalletConfig, WalletError};
use logwallet_primitives::base58;
use logwallet_primitives::{decode_p2pkh_address, encode_p2pkh_address, AddressError};
use logwallet_storage::memory::MemoryRecordLog;

use common::{master, memory_wallet, wallet_with_master};

#[test]
fn listed_addresses_round_trip_to_keys() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    let version = wallet.params().b58prefix_pubkey_address;

    let mut hashes = Vec::new();
    for _ in 0..5 {
        hashes.push(wallet.next_key().expect("derive").hash160());
    }

    let addresses = wallet.get_addresses();
    assert_eq!(addresses.len(), 5);
    for hash in &hashes {
        let address = encode_p2pkh_address(hash, version);
        assert!(addresses.contains(&address));

        let payload = base58::decode_check(&address).expect("base58");
        assert_eq!(payload[0], version);
        assert_eq!(&payload[1..], hash);
        assert_eq!(decode_p2pkh_address(&address, version), Ok(*hash));

        let node = wallet.find_key(&address).expect("known address");
        assert_eq!(&node.hash160(), hash);
        assert!(!node.has_private_key());
        assert!(wallet.have_key(hash));
    }

    let mut sorted = addresses.clone();
    sorted.sort_by_key(|address| decode_p2pkh_address(address, version).expect("decode"));
    assert_eq!(sorted, addresses);
}

#[test]
fn unknown_and_malformed_addresses() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    let node = wallet.next_key().expect("derive");
    let address = encode_p2pkh_address(&node.hash160(), 0x00);

    assert!(wallet.find_key(&encode_p2pkh_address(&[7u8; 20], 0x00)).is_none());
    assert!(wallet.find_key("not-base58-0OIl").is_none());
    assert!(matches!(
        wallet.lookup_address("not-base58-0OIl"),
        Err(WalletError::Address(AddressError::InvalidCharacter))
    ));

    let mut corrupted = address.clone();
    let last = corrupted.pop().expect("non-empty");
    corrupted.push(if last == '1' { '2' } else { '1' });
    assert!(matches!(
        wallet.lookup_address(&corrupted),
        Err(WalletError::Address(AddressError::InvalidChecksum))
    ));

    let testnet = encode_p2pkh_address(&node.hash160(), 0x6f);
    assert!(matches!(
        wallet.lookup_address(&testnet),
        Err(WalletError::Address(AddressError::UnknownPrefix))
    ));
    assert_eq!(wallet.key_count(), 1);
}

#[test]
fn derivation_without_master_key_fails_cleanly() {
    let log = MemoryRecordLog::new();
    let mut wallet = memory_wallet(&log);
    assert!(matches!(wallet.next_key(), Err(WalletError::MissingMasterKey)));
    assert_eq!(wallet.next_child_index(), 0);
    assert!(wallet.get_addresses().is_empty());
    assert!(log.is_empty());
}

#[test]
fn derived_key_matches_master_derivation() {
    let log = MemoryRecordLog::new();
    let mut wallet = wallet_with_master(&log);
    let derived = wallet.next_key().expect("derive");
    assert_eq!(derived, master().derive_private_child(0).expect("direct"));
    assert!(derived.private_key().is_some());
}

#[test]
fn testnet_wallet_uses_testnet_versions() {
    let config = WalletConfig::parse("network=testnet").expect("config");
    let mut wallet = Wallet::new(&config);
    wallet
        .load_store(MemoryRecordLog::new())
        .expect("load memory log");
    wallet.set_master_key(&master()).expect("master");
    let node = wallet.next_key().expect("derive");

    let addresses = wallet.get_addresses();
    assert_eq!(addresses, vec![encode_p2pkh_address(&node.hash160(), 0x6f)]);
    assert!(addresses[0].starts_with('m') || addresses[0].starts_with('n'));
    assert!(wallet.find_key(&addresses[0]).is_some());
}
