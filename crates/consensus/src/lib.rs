//! Chain constants and network parameters consumed by the wallet core.

pub mod constants;
pub mod money;
pub mod params;

pub use params::{chain_params, ChainParams, Network};

pub type Hash256 = [u8; 32];
pub type Hash160 = [u8; 20];
