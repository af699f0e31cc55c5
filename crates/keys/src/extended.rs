use std::fmt;
use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use logwallet_consensus::constants::BIP32_HARDENED_INDEX;
use logwallet_consensus::{ChainParams, Hash160};
use logwallet_primitives::{base58, hash160, AddressError};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// Length of the binary BIP32 payload before base58-check.
pub const SERIALIZED_LEN: usize = 78;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    InvalidSeed,
    InvalidKey,
    /// The derived scalar was out of range; the next index must be used.
    InvalidChildIndex(u32),
    Encoding(AddressError),
    UnknownVersion(u32),
    InvalidLength(usize),
    MissingPrivateKey,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::InvalidSeed => write!(
                f,
                "seed must be between {MIN_SEED_LEN} and {MAX_SEED_LEN} bytes"
            ),
            KeyError::InvalidKey => write!(f, "invalid key material"),
            KeyError::InvalidChildIndex(index) => {
                write!(f, "child index {index} yields an invalid key")
            }
            KeyError::Encoding(err) => write!(f, "{err}"),
            KeyError::UnknownVersion(version) => {
                write!(f, "unknown extended key version {version:#010x}")
            }
            KeyError::InvalidLength(len) => write!(
                f,
                "extended key payload is {len} bytes, expected {SERIALIZED_LEN}"
            ),
            KeyError::MissingPrivateKey => write!(f, "extended key has no private key"),
        }
    }
}

impl std::error::Error for KeyError {}

impl From<AddressError> for KeyError {
    fn from(err: AddressError) -> Self {
        KeyError::Encoding(err)
    }
}

/// A BIP32 node: chain code, compressed public key and, for private nodes,
/// the secret scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    public_key: [u8; 33],
    private_key: Option<[u8; 32]>,
}

impl ExtendedKey {
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(KeyError::InvalidSeed);
        }
        let mut output = hmac_sha512(MASTER_HMAC_KEY, &[seed])?;
        let result = Self::from_hmac_output(&output, 0, [0u8; 4], 0);
        output.zeroize();
        result.map_err(|_| KeyError::InvalidSeed)
    }

    pub fn from_private_parts(
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
        chain_code: [u8; 32],
        private_key: [u8; 32],
    ) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(&private_key).map_err(|_| KeyError::InvalidKey)?;
        Ok(Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            public_key: PublicKey::from_secret_key(secp(), &secret).serialize(),
            private_key: Some(private_key),
        })
    }

    pub fn from_public_parts(
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
        chain_code: [u8; 32],
        public_key: [u8; 33],
    ) -> Result<Self, KeyError> {
        PublicKey::from_slice(&public_key).map_err(|_| KeyError::InvalidKey)?;
        Ok(Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            public_key,
            private_key: None,
        })
    }

    fn from_hmac_output(
        output: &[u8; 64],
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
    ) -> Result<Self, KeyError> {
        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&output[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        let result = Self::from_private_parts(
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            private_key,
        );
        private_key.zeroize();
        result
    }

    /// Derives the child at `index`; indices at or above 2^31 are hardened.
    pub fn derive_private_child(&self, index: u32) -> Result<Self, KeyError> {
        let mut private_key = self.private_key.ok_or(KeyError::MissingPrivateKey)?;
        let parent = SecretKey::from_slice(&private_key).map_err(|_| KeyError::InvalidKey);

        let index_bytes = index.to_be_bytes();
        let output = if index >= BIP32_HARDENED_INDEX {
            hmac_sha512(&self.chain_code, &[&[0u8][..], &private_key[..], &index_bytes[..]])
        } else {
            hmac_sha512(&self.chain_code, &[&self.public_key[..], &index_bytes[..]])
        };
        private_key.zeroize();
        let parent = parent?;
        let mut output = output?;

        let mut tweak_bytes = [0u8; 32];
        tweak_bytes.copy_from_slice(&output[..32]);
        let tweak =
            Scalar::from_be_bytes(tweak_bytes).map_err(|_| KeyError::InvalidChildIndex(index));
        tweak_bytes.zeroize();
        let child = tweak.and_then(|tweak| {
            parent
                .add_tweak(&tweak)
                .map_err(|_| KeyError::InvalidChildIndex(index))
        });

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        let child = child?;
        Ok(Self {
            depth: self.depth.saturating_add(1),
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            public_key: PublicKey::from_secret_key(secp(), &child).serialize(),
            private_key: Some(child.secret_bytes()),
        })
    }

    /// A copy of this node without its private key.
    pub fn neutered(&self) -> Self {
        Self {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            public_key: self.public_key,
            private_key: None,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> &[u8; 33] {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&[u8; 32]> {
        self.private_key.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn hash160(&self) -> Hash160 {
        hash160(&self.public_key)
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = self.hash160();
        [hash[0], hash[1], hash[2], hash[3]]
    }

    pub fn serialize_private(&self, params: &ChainParams) -> Result<String, KeyError> {
        let private_key = self.private_key.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        let mut key = [0u8; 33];
        key[1..].copy_from_slice(private_key);
        let mut payload = self.payload(params.bip32_private, &key);
        key.zeroize();
        let text = base58::encode_check(&payload);
        payload.zeroize();
        Ok(text)
    }

    pub fn serialize_public(&self, params: &ChainParams) -> String {
        base58::encode_check(&self.payload(params.bip32_public, &self.public_key))
    }

    fn payload(&self, version: u32, key: &[u8; 33]) -> [u8; SERIALIZED_LEN] {
        let mut out = [0u8; SERIALIZED_LEN];
        out[0..4].copy_from_slice(&version.to_be_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        out[45..78].copy_from_slice(key);
        out
    }

    /// Parses xprv/xpub text using the version words of `params`.
    pub fn deserialize(text: &str, params: &ChainParams) -> Result<Self, KeyError> {
        let mut payload = base58::decode_check(text)?;
        let result = Self::from_payload(&payload, params);
        payload.zeroize();
        result
    }

    fn from_payload(payload: &[u8], params: &ChainParams) -> Result<Self, KeyError> {
        if payload.len() != SERIALIZED_LEN {
            return Err(KeyError::InvalidLength(payload.len()));
        }
        let version = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
        let depth = payload[4];
        let parent_fingerprint = [payload[5], payload[6], payload[7], payload[8]];
        let child_number = u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);
        let key = &payload[45..78];

        if version == params.bip32_private {
            if key[0] != 0 {
                return Err(KeyError::InvalidKey);
            }
            let mut private_key = [0u8; 32];
            private_key.copy_from_slice(&key[1..]);
            let result = Self::from_private_parts(
                depth,
                parent_fingerprint,
                child_number,
                chain_code,
                private_key,
            );
            private_key.zeroize();
            result
        } else if version == params.bip32_public {
            let mut public_key = [0u8; 33];
            public_key.copy_from_slice(key);
            Self::from_public_parts(depth, parent_fingerprint, child_number, chain_code, public_key)
        } else {
            Err(KeyError::UnknownVersion(version))
        }
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        if let Some(private_key) = self.private_key.as_mut() {
            private_key.zeroize();
        }
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("public_key", &hex(&self.public_key))
            .field("private", &self.private_key.is_some())
            .finish()
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64], KeyError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|_| KeyError::InvalidKey)?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

fn secp() -> &'static Secp256k1<secp256k1::All> {
    static SECP: OnceLock<Secp256k1<secp256k1::All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}
