//! Per-network parameters: address version bytes and BIP32 version words.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Some(Network::Mainnet),
            "test" | "testnet" => Some(Network::Testnet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainParams {
    pub network: Network,
    /// Version byte prefixed to a pay-to-pubkey-hash address payload.
    pub b58prefix_pubkey_address: u8,
    pub bip32_public: u32,
    pub bip32_private: u32,
}

pub fn chain_params(network: Network) -> ChainParams {
    match network {
        Network::Mainnet => ChainParams {
            network,
            b58prefix_pubkey_address: 0x00,
            bip32_public: 0x0488_B21E,
            bip32_private: 0x0488_ADE4,
        },
        Network::Testnet | Network::Regtest => ChainParams {
            network,
            b58prefix_pubkey_address: 0x6f,
            bip32_public: 0x0435_87CF,
            bip32_private: 0x0435_8394,
        },
    }
}
