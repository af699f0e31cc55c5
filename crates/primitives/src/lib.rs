//! Transaction types, consensus serialization, hashing and base58 text codecs.

pub mod address;
pub mod base58;
pub mod encoding;
pub mod hash;
pub mod outpoint;
pub mod transaction;

pub use address::{decode_p2pkh_address, encode_p2pkh_address, p2pkh_script, AddressError};
pub use hash::{hash160, sha256, sha256d};
pub use outpoint::OutPoint;
pub use transaction::{Transaction, TxIn, TxOut};
