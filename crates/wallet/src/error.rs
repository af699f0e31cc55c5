use std::fmt;

use logwallet_keys::KeyError;
use logwallet_primitives::encoding::DecodeError;
use logwallet_primitives::AddressError;
use logwallet_storage::StoreError;

#[derive(Debug)]
pub enum WalletError {
    /// A record store is already attached to this wallet.
    AlreadyOpen,
    Store(StoreError),
    /// No record store has been loaded yet.
    NotLoaded,
    MissingMasterKey,
    MissingPrivateKey,
    Key(KeyError),
    Address(AddressError),
    Decode(DecodeError),
    Config(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::AlreadyOpen => write!(f, "wallet store is already open"),
            WalletError::Store(err) => write!(f, "{err}"),
            WalletError::NotLoaded => write!(f, "wallet store is not loaded"),
            WalletError::MissingMasterKey => write!(f, "wallet has no master key"),
            WalletError::MissingPrivateKey => write!(f, "master key must carry a private key"),
            WalletError::Key(err) => write!(f, "{err}"),
            WalletError::Address(err) => write!(f, "{err}"),
            WalletError::Decode(err) => write!(f, "{err}"),
            WalletError::Config(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for WalletError {}

impl From<StoreError> for WalletError {
    fn from(err: StoreError) -> Self {
        WalletError::Store(err)
    }
}

impl From<KeyError> for WalletError {
    fn from(err: KeyError) -> Self {
        WalletError::Key(err)
    }
}

impl From<AddressError> for WalletError {
    fn from(err: AddressError) -> Self {
        WalletError::Address(err)
    }
}

impl From<DecodeError> for WalletError {
    fn from(err: DecodeError) -> Self {
        WalletError::Decode(err)
    }
}
