use logwallet_script::standard::{
    classify_script_pubkey, solve_script_pubkey, ScriptSolution, ScriptType,
};

fn p2pkh(hash: [u8; 20]) -> Vec<u8> {
    let mut script = vec![0x76, 0xa9, 0x14];
    script.extend_from_slice(&hash);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

#[test]
fn classify_p2pkh() {
    let script = p2pkh([0x11; 20]);
    assert_eq!(classify_script_pubkey(&script), ScriptType::P2Pkh);
    assert_eq!(
        solve_script_pubkey(&script).pubkey_hash(),
        Some(&[0x11; 20])
    );
}

#[test]
fn classify_p2sh() {
    let mut script = vec![0xa9, 0x14];
    script.extend_from_slice(&[0x22; 20]);
    script.push(0x87);
    assert_eq!(
        solve_script_pubkey(&script),
        ScriptSolution::ScriptHash([0x22; 20])
    );
    assert_eq!(solve_script_pubkey(&script).pubkey_hash(), None);
}

#[test]
fn classify_witness_programs() {
    let mut wpkh = vec![0x00, 0x14];
    wpkh.extend_from_slice(&[0x33; 20]);
    assert_eq!(classify_script_pubkey(&wpkh), ScriptType::P2Wpkh);

    let mut wsh = vec![0x00, 0x20];
    wsh.extend_from_slice(&[0x44; 32]);
    assert_eq!(classify_script_pubkey(&wsh), ScriptType::P2Wsh);
}

#[test]
fn classify_p2pk() {
    let mut script = vec![33];
    script.extend_from_slice(&[0x02; 33]);
    script.push(0xac);
    assert_eq!(
        solve_script_pubkey(&script),
        ScriptSolution::PubKey(vec![0x02; 33])
    );
}

#[test]
fn classify_multisig() {
    let mut script = vec![0x51];
    for fill in [0x02u8, 0x03] {
        script.push(33);
        script.extend_from_slice(&[fill; 33]);
    }
    script.extend_from_slice(&[0x52, 0xae]);
    match solve_script_pubkey(&script) {
        ScriptSolution::Multisig { required, pubkeys } => {
            assert_eq!(required, 1);
            assert_eq!(pubkeys, vec![vec![0x02; 33], vec![0x03; 33]]);
        }
        other => panic!("unexpected solution {other:?}"),
    }
}

#[test]
fn multisig_with_wrong_key_count_is_unknown() {
    let mut script = vec![0x51, 33];
    script.extend_from_slice(&[0x02; 33]);
    script.extend_from_slice(&[0x53, 0xae]);
    assert_eq!(classify_script_pubkey(&script), ScriptType::Unknown);
}

#[test]
fn classify_null_data_and_unknown() {
    assert_eq!(
        classify_script_pubkey(&[0x6a, 0x01, 0x01]),
        ScriptType::NullData
    );
    assert_eq!(classify_script_pubkey(&[]), ScriptType::Unknown);
    // A bare 20-byte push looks like a key hash but is not pay-to-pubkey-hash.
    let mut bare = vec![0x14];
    bare.extend_from_slice(&[0x11; 20]);
    assert_eq!(classify_script_pubkey(&bare), ScriptType::Unknown);
}
