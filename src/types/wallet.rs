use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::constants::{
    DEVNET_FULLNODE, MAINNET_FULLNODE, NETWORK_DEVNET, NETWORK_MAINNET, NETWORK_TESTNET,
    TESTNET_FULLNODE,
};

/// Sui network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => NETWORK_MAINNET,
            Network::Testnet => NETWORK_TESTNET,
            Network::Devnet => NETWORK_DEVNET,
        }
    }

    /// Public fullnode JSON-RPC endpoint
    pub fn fullnode_url(self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_FULLNODE,
            Network::Testnet => TESTNET_FULLNODE,
            Network::Devnet => DEVNET_FULLNODE,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "devnet" | "dev" => Ok(Network::Devnet),
            _ => Err(format!(
                "Invalid network '{}'. Valid options: mainnet, testnet, devnet",
                s
            )),
        }
    }
}

/// Connection lifecycle of the wallet session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The connected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    /// Balance in MIST, kept as a decimal string
    pub balance: String,
    pub network: Network,
    pub connected: bool,
    pub connecting: bool,
}
