//! Single-level BIP32 key nodes.

mod extended;

pub use extended::{ExtendedKey, KeyError, SERIALIZED_LEN};
