//! Standard script classification utilities.

use logwallet_consensus::{Hash160, Hash256};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptType {
    P2Pk,
    P2Pkh,
    P2Sh,
    P2Wpkh,
    P2Wsh,
    Multisig,
    NullData,
    Unknown,
}

/// A classified output script together with the data it commits to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScriptSolution {
    PubKey(Vec<u8>),
    PubKeyHash(Hash160),
    ScriptHash(Hash160),
    WitnessPubKeyHash(Hash160),
    WitnessScriptHash(Hash256),
    Multisig { required: u8, pubkeys: Vec<Vec<u8>> },
    NullData,
    Unknown,
}

impl ScriptSolution {
    pub fn script_type(&self) -> ScriptType {
        match self {
            ScriptSolution::PubKey(_) => ScriptType::P2Pk,
            ScriptSolution::PubKeyHash(_) => ScriptType::P2Pkh,
            ScriptSolution::ScriptHash(_) => ScriptType::P2Sh,
            ScriptSolution::WitnessPubKeyHash(_) => ScriptType::P2Wpkh,
            ScriptSolution::WitnessScriptHash(_) => ScriptType::P2Wsh,
            ScriptSolution::Multisig { .. } => ScriptType::Multisig,
            ScriptSolution::NullData => ScriptType::NullData,
            ScriptSolution::Unknown => ScriptType::Unknown,
        }
    }

    /// The key hash of a pay-to-pubkey-hash output, and nothing else.
    pub fn pubkey_hash(&self) -> Option<&Hash160> {
        match self {
            ScriptSolution::PubKeyHash(hash) => Some(hash),
            _ => None,
        }
    }
}

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_RETURN: u8 = 0x6a;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

pub fn classify_script_pubkey(script: &[u8]) -> ScriptType {
    solve_script_pubkey(script).script_type()
}

pub fn solve_script_pubkey(script: &[u8]) -> ScriptSolution {
    if is_p2pkh(script) {
        ScriptSolution::PubKeyHash(fixed(&script[3..23]))
    } else if is_p2sh(script) {
        ScriptSolution::ScriptHash(fixed(&script[2..22]))
    } else if is_p2wpkh(script) {
        ScriptSolution::WitnessPubKeyHash(fixed(&script[2..22]))
    } else if is_p2wsh(script) {
        ScriptSolution::WitnessScriptHash(fixed(&script[2..34]))
    } else if is_p2pk(script) {
        ScriptSolution::PubKey(script[1..script.len() - 1].to_vec())
    } else if script.first() == Some(&OP_RETURN) {
        ScriptSolution::NullData
    } else if let Some((required, pubkeys)) = parse_multisig(script) {
        ScriptSolution::Multisig { required, pubkeys }
    } else {
        ScriptSolution::Unknown
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

fn is_p2pkh(script: &[u8]) -> bool {
    script.len() == 25
        && script[0] == OP_DUP
        && script[1] == OP_HASH160
        && script[2] == 0x14
        && script[23] == OP_EQUALVERIFY
        && script[24] == OP_CHECKSIG
}

fn is_p2sh(script: &[u8]) -> bool {
    script.len() == 23 && script[0] == OP_HASH160 && script[1] == 0x14 && script[22] == OP_EQUAL
}

fn is_p2wpkh(script: &[u8]) -> bool {
    script.len() == 22 && script[0] == OP_0 && script[1] == 0x14
}

fn is_p2wsh(script: &[u8]) -> bool {
    script.len() == 34 && script[0] == OP_0 && script[1] == 0x20
}

fn is_p2pk(script: &[u8]) -> bool {
    let key_len = match script.first().copied() {
        Some(len @ 33) | Some(len @ 65) => len,
        _ => return false,
    };
    script.len() == key_len as usize + 2 && script[script.len() - 1] == OP_CHECKSIG
}

fn small_int(opcode: u8) -> Option<u8> {
    (OP_1..=OP_16).contains(&opcode).then(|| opcode - OP_1 + 1)
}

// OP_m <pubkey>... OP_n OP_CHECKMULTISIG
fn parse_multisig(script: &[u8]) -> Option<(u8, Vec<Vec<u8>>)> {
    let (&last, body) = script.split_last()?;
    if last != OP_CHECKMULTISIG {
        return None;
    }
    let (&first, body) = body.split_first()?;
    let (&total_op, mut keys) = body.split_last()?;
    let required = small_int(first)?;
    let total = small_int(total_op)?;

    let mut pubkeys = Vec::with_capacity(total as usize);
    while let Some((&len, rest)) = keys.split_first() {
        if len != 33 && len != 65 {
            return None;
        }
        if rest.len() < len as usize {
            return None;
        }
        pubkeys.push(rest[..len as usize].to_vec());
        keys = &rest[len as usize..];
    }

    if pubkeys.len() != total as usize || required > total {
        return None;
    }
    Some((required, pubkeys))
}
