//! Monetary units.

/// Value in the chain's smallest unit.
pub type Amount = i64;
