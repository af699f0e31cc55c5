//! Chain-wide constants shared by wallet accounting.

/// Coinbase transaction outputs can only be spent after this number of new blocks.
pub const COINBASE_MATURITY: u32 = 100;

/// First BIP32 child index that selects hardened derivation.
pub const BIP32_HARDENED_INDEX: u32 = 0x8000_0000;
