//! Wallet core rebuilt from an append-only record log.
//!
//! Every mutation is appended to the [`RecordStore`] before it is mirrored
//! into memory; loading replays the log to rebuild the master key, the key
//! index, the transaction index and the spend set.

mod config;
mod error;
mod keyindex;
pub mod records;
mod replay;
mod txindex;
mod wallet;

pub use config::{WalletConfig, CONF_FILE_NAME};
pub use error::WalletError;
pub use keyindex::KeyIndex;
pub use records::WalletTransaction;
pub use replay::LoadStats;
pub use txindex::{SpendSet, TransactionIndex};
pub use wallet::{Output, Wallet};

pub use logwallet_storage::RecordStore;
